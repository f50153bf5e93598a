use crate::models::{GlucosePageView, HistoryView, StatusMessage, VitalsView};
use crate::theme::Theme;

pub const VITALS_PATH: &str = "/";
pub const GLUCOSE_PATH: &str = "/glicemia";
pub const HISTORY_PATH: &str = "/historico";

const NAV_ITEMS: [(&str, &str); 3] = [
    (VITALS_PATH, "Nova Medição"),
    (HISTORY_PATH, "Histórico"),
    (GLUCOSE_PATH, "Glicemia Mary"),
];

pub fn render_vitals_page(view: &VitalsView, theme: Theme) -> String {
    let form = &view.form;
    let content = fill(
        VITALS_HTML,
        &[
            ("SYSTOLIC", &escape_html(&form.systolic)),
            ("DIASTOLIC", &escape_html(&form.diastolic)),
            ("PULSE", &escape_html(&form.pulse)),
            ("GLUCOSE", &escape_html(&form.glucose)),
            ("DATE", &escape_html(&form.date)),
            ("TIME", &escape_html(&form.time)),
            ("DISABLED", disabled(view.submitting)),
            ("SUBMIT_LABEL", if view.submitting { "Enviando..." } else { "Enviar" }),
            ("STATUS", &render_status(view.status.as_ref())),
        ],
    );
    render_layout("Nova Medição", VITALS_PATH, theme, &content, "")
}

pub fn render_glucose_page(page: &GlucosePageView, theme: Theme) -> String {
    let form = &page.form;
    let list = &page.list;

    let groups: String = list
        .groups
        .iter()
        .map(|group| {
            let entries: String = group
                .entries
                .iter()
                .map(|entry| {
                    format!(
                        "<li data-key=\"{}\"><span class=\"entry-time\">{}</span><span class=\"entry-value\">{} mg/dL</span></li>",
                        escape_html(&entry.key),
                        escape_html(&entry.time),
                        escape_html(&entry.glucose),
                    )
                })
                .collect();
            format!(
                "<details class=\"day\" open><summary>{}</summary><ul>{entries}</ul></details>",
                escape_html(&group.label),
            )
        })
        .collect();

    let error = list
        .error
        .as_deref()
        .map(|text| format!("<p class=\"status\" data-type=\"error\">{}</p>", escape_html(text)))
        .unwrap_or_default();

    let content = fill(
        GLUCOSE_HTML,
        &[
            ("GLUCOSE", &escape_html(&form.glucose)),
            ("TIME", &escape_html(&form.time)),
            ("MANUAL", if form.manual_time { "true" } else { "false" }),
            ("DISABLED", disabled(form.submitting)),
            ("SUBMIT_LABEL", if form.submitting { "Enviando..." } else { "Registrar" }),
            ("STATUS", &render_status(form.status.as_ref())),
            ("LOAD_DISABLED", disabled(list.loading)),
            ("LOAD_LABEL", list.load_more_label),
            ("LIST_ERROR", &error),
            ("GROUPS", &groups),
        ],
    );
    render_layout("Registrar Glicemia", GLUCOSE_PATH, theme, &content, GLUCOSE_SCRIPT)
}

pub fn render_history_page(view: &HistoryView, theme: Theme) -> String {
    let rows: String = if view.rows.is_empty() {
        "<tr><td class=\"empty\" colspan=\"6\">Nenhum dado encontrado para o intervalo selecionado.</td></tr>".to_string()
    } else {
        view.rows
            .iter()
            .map(|row| {
                format!(
                    "<tr data-key=\"{}\"><td>{}</td><td>{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td></tr>",
                    escape_html(&row.key),
                    escape_html(&row.date),
                    escape_html(&row.time),
                    escape_html(&row.systolic),
                    escape_html(&row.diastolic),
                    escape_html(&row.pulse),
                    escape_html(&row.glucose),
                )
            })
            .collect()
    };

    let error = view
        .error
        .as_deref()
        .map(|text| format!("<p class=\"status\" data-type=\"error\">{}</p>", escape_html(text)))
        .unwrap_or_default();

    let content = fill(
        HISTORY_HTML,
        &[
            ("START", &escape_html(&view.start_date)),
            ("END", &escape_html(&view.end_date)),
            ("LOADING", if view.loading { "<p class=\"status\" data-type=\"info\">Carregando registros...</p>" } else { "" }),
            ("ERROR", &error),
            ("ROWS", &rows),
        ],
    );
    let script = fill(HISTORY_SCRIPT, &[("CHART_JSON", &script_json(&view.chart))]);
    render_layout("Histórico de Medições", HISTORY_PATH, theme, &content, &script)
}

fn render_layout(title: &str, path: &str, theme: Theme, content: &str, script: &str) -> String {
    let nav: String = NAV_ITEMS
        .iter()
        .map(|(href, label)| {
            let active = if *href == path { " class=\"active\" aria-current=\"page\"" } else { "" };
            format!("<a href=\"{href}\"{active}>{label}</a>")
        })
        .collect();

    fill(
        LAYOUT_HTML,
        &[
            ("THEME", theme.as_str()),
            ("TITLE", &escape_html(title)),
            ("LOGO", LOGO_SVG),
            ("NAV", &nav),
            ("PATH", &escape_html(path)),
            ("THEME_LABEL", theme.toggle_label()),
            ("CONTENT", content),
            ("SCRIPT", script),
        ],
    )
}

fn render_status(status: Option<&StatusMessage>) -> String {
    match status {
        Some(status) => format!(
            "<p class=\"status\" data-type=\"{}\" role=\"status\">{}</p>",
            status.kind.as_str(),
            escape_html(&status.text)
        ),
        None => String::new(),
    }
}

fn disabled(flag: bool) -> &'static str {
    if flag { "disabled" } else { "" }
}

/// Single pass over `{{KEY}}` placeholders; inserted values are never
/// rescanned, so user text cannot inject another placeholder.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        let key = &after[..end];
        match values.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + end + 4]),
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// JSON safe to place inside a `<script>` element.
fn script_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "null".to_string())
        .replace("</", "<\\/")
}

const LOGO_SVG: &str = r##"<svg class="logo" viewBox="0 0 32 32" width="28" height="28" aria-hidden="true"><circle cx="16" cy="16" r="15" fill="#ffffff" /><path d="M16 25s-8-5.2-8-11a4.6 4.6 0 0 1 8-3.1A4.6 4.6 0 0 1 24 14c0 5.8-8 11-8 11z" fill="#ea4335" /><path d="M7 16h5l2-3 3 6 2-3h6" fill="none" stroke="#ffffff" stroke-width="1.6" stroke-linecap="round" stroke-linejoin="round" /></svg>"##;

const LAYOUT_HTML: &str = r##"<!DOCTYPE html>
<html lang="pt-BR" class="{{THEME}}" data-theme="{{THEME}}">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <meta name="theme-color" content="#1a73e8" />
  <link rel="manifest" href="/manifest.webmanifest" />
  <title>{{TITLE}} · Saúde Diária</title>
  <style>
    :root {
      --blue: #1a73e8;
      --blue-light: #4285f4;
      --blue-dark: #174ea6;
      --red: #ea4335;
      --yellow: #fbbc04;
      --green: #34a853;
      --gray-light: #f1f3f4;
      --gray-mid: #5f6368;
      --gray-dark: #202124;
      --bg: var(--gray-light);
      --card: #ffffff;
      --ink: #202124;
      --muted: var(--gray-mid);
      --line: #dadce0;
    }

    html.dark {
      --bg: var(--gray-dark);
      --card: #2d2e31;
      --ink: #e8eaed;
      --muted: #9aa0a6;
      --line: #5f6368;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: system-ui, Avenir, Helvetica, Arial, sans-serif;
    }

    .topbar {
      position: fixed;
      inset: 0 0 auto 0;
      z-index: 50;
      display: flex;
      align-items: center;
      gap: 24px;
      padding: 12px 24px;
      background: var(--blue);
      box-shadow: 0 2px 6px rgba(0, 0, 0, 0.2);
    }

    html.dark .topbar {
      background: var(--blue-dark);
    }

    .brand {
      display: inline-flex;
      align-items: center;
      gap: 8px;
      color: white;
      font-weight: 700;
      text-decoration: none;
    }

    .menu {
      display: flex;
      gap: 8px;
    }

    .menu a {
      color: white;
      font-weight: 600;
      text-decoration: none;
      padding: 6px 12px;
      border-radius: 6px;
    }

    .menu a.active,
    .menu a:hover {
      background: var(--blue-light);
    }

    .menu-toggle {
      display: none;
      background: transparent;
      border: none;
      color: white;
      cursor: pointer;
    }

    .theme-form {
      margin-left: auto;
    }

    .theme-toggle {
      background: var(--blue-light);
      color: white;
      border: none;
      border-radius: 6px;
      padding: 6px 12px;
      cursor: pointer;
    }

    main {
      max-width: 64rem;
      margin: 0 auto;
      padding: 88px 16px 32px;
      display: grid;
      gap: 24px;
      justify-items: center;
    }

    .card {
      width: min(100%, 28rem);
      background: var(--card);
      border-radius: 12px;
      padding: 24px;
      box-shadow: 0 8px 24px rgba(0, 0, 0, 0.12);
      display: grid;
      gap: 16px;
    }

    .card.wide {
      width: 100%;
    }

    h1 {
      margin: 0;
      text-align: center;
      color: var(--blue);
    }

    html.dark h1 {
      color: var(--blue-light);
    }

    label,
    fieldset {
      display: grid;
      gap: 6px;
      font-weight: 600;
      border: none;
      padding: 0;
      margin: 0;
    }

    .row {
      display: grid;
      grid-template-columns: repeat(3, 1fr);
      gap: 8px;
    }

    input {
      width: 100%;
      padding: 8px;
      border-radius: 6px;
      border: 1px solid var(--line);
      background: var(--card);
      color: var(--ink);
      font-size: 1rem;
    }

    button.primary,
    button.secondary {
      width: 100%;
      border: none;
      border-radius: 6px;
      padding: 10px;
      color: white;
      font-size: 1rem;
      font-weight: 600;
      cursor: pointer;
    }

    button.primary {
      background: var(--blue);
    }

    button.secondary {
      background: var(--green);
    }

    button:disabled {
      opacity: 0.6;
      cursor: not-allowed;
    }

    .status {
      margin: 0;
      text-align: center;
      font-weight: 600;
    }

    .status[data-type="success"] {
      color: var(--green);
    }

    .status[data-type="warning"] {
      color: #b06000;
    }

    .status[data-type="error"] {
      color: var(--red);
    }

    .day {
      border: 1px solid var(--line);
      border-radius: 8px;
      padding: 8px 12px;
    }

    .day summary {
      font-weight: 700;
      cursor: pointer;
    }

    .day ul {
      list-style: none;
      margin: 8px 0 0;
      padding: 0;
      display: grid;
      gap: 4px;
    }

    .day li {
      display: flex;
      justify-content: space-between;
    }

    .entry-time {
      color: var(--muted);
    }

    .filters {
      display: flex;
      flex-wrap: wrap;
      gap: 16px;
      align-items: end;
    }

    table {
      width: 100%;
      border-collapse: collapse;
    }

    th,
    td {
      border: 1px solid var(--line);
      padding: 6px 10px;
      text-align: left;
    }

    td.num {
      text-align: right;
    }

    td.empty {
      text-align: center;
      color: var(--muted);
    }

    tbody tr:nth-child(even) {
      background: var(--bg);
    }

    .chart-card svg {
      width: 100%;
      height: auto;
    }

    .legend {
      display: flex;
      flex-wrap: wrap;
      justify-content: center;
      gap: 16px;
      font-weight: 700;
    }

    .legend span::before {
      content: "";
      display: inline-block;
      width: 12px;
      height: 12px;
      margin-right: 6px;
      border-radius: 2px;
      background: var(--swatch);
    }

    @media (max-width: 640px) {
      .menu-toggle {
        display: inline-flex;
      }

      .menu {
        display: none;
        position: absolute;
        top: 100%;
        left: 0;
        right: 0;
        flex-direction: column;
        padding: 8px 16px;
        background: var(--blue);
      }

      .menu.open {
        display: flex;
      }
    }
  </style>
</head>
<body>
  <nav class="topbar">
    <a class="brand" href="/">{{LOGO}}<span>Saúde Diária</span></a>
    <button class="menu-toggle" id="menu-toggle" type="button" aria-label="Menu" aria-expanded="false" aria-controls="menu">
      <svg width="24" height="24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" viewBox="0 0 24 24"><path d="M4 6h16M4 12h16M4 18h16" /></svg>
    </button>
    <div class="menu" id="menu">{{NAV}}</div>
    <form class="theme-form" method="post" action="/tema">
      <input type="hidden" name="next" value="{{PATH}}" />
      <button class="theme-toggle" type="submit" aria-label="Alternar tema claro/escuro" title="Alternar tema claro/escuro">{{THEME_LABEL}}</button>
    </form>
  </nav>

  <main>
{{CONTENT}}
  </main>

  <script>
    const menuToggle = document.getElementById('menu-toggle');
    const menu = document.getElementById('menu');
    menuToggle.addEventListener('click', () => {
      const open = menu.classList.toggle('open');
      menuToggle.setAttribute('aria-expanded', String(open));
    });

    document.querySelectorAll('form[data-once]').forEach((form) => {
      form.addEventListener('submit', (event) => {
        const button = form.querySelector('button[type="submit"]');
        if (button.disabled) {
          event.preventDefault();
          return;
        }
        button.disabled = true;
      });
    });
  </script>
{{SCRIPT}}
</body>
</html>
"##;

const VITALS_HTML: &str = r##"    <section class="card">
      <h1>Saúde Diária</h1>
      <form class="card-form" method="post" action="/registro" data-once>
        <fieldset>
          <legend>Pressão arterial (Sistólica / Diastólica / Pulso)</legend>
          <div class="row">
            <input type="number" name="systolic" inputmode="numeric" placeholder="Sistólica" value="{{SYSTOLIC}}" />
            <input type="number" name="diastolic" inputmode="numeric" placeholder="Diastólica" value="{{DIASTOLIC}}" />
            <input type="number" name="pulse" inputmode="numeric" placeholder="Pulso" value="{{PULSE}}" />
          </div>
        </fieldset>
        <label>
          Glicemia (mg/dL)
          <input type="number" name="glucose" inputmode="numeric" value="{{GLUCOSE}}" />
        </label>
        <label>
          Data
          <input type="date" name="date" value="{{DATE}}" />
        </label>
        <label>
          Horário
          <input type="time" name="time" value="{{TIME}}" />
        </label>
        <button class="primary" type="submit" {{DISABLED}}>{{SUBMIT_LABEL}}</button>
        {{STATUS}}
      </form>
    </section>"##;

const GLUCOSE_HTML: &str = r##"    <section class="card">
      <h1>Registrar Glicemia</h1>
      <form id="glucose-form" method="post" action="/glicemia" data-once>
        <label>
          Glicemia (mg/dL)
          <input type="number" name="glucose" inputmode="numeric" placeholder="Ex.: 110" min="0" step="1" value="{{GLUCOSE}}" required />
        </label>
        <label>
          Horário
          <input id="time-input" type="time" name="time" value="{{TIME}}" data-manual="{{MANUAL}}" required />
        </label>
        <input id="rendered-time" type="hidden" name="renderedTime" value="{{TIME}}" />
        <button class="primary" type="submit" {{DISABLED}}>{{SUBMIT_LABEL}}</button>
        {{STATUS}}
      </form>

      <form method="post" action="/glicemia/mais" data-once>
        <button class="secondary" type="submit" {{LOAD_DISABLED}}>{{LOAD_LABEL}}</button>
      </form>
      {{LIST_ERROR}}
      <div class="days">{{GROUPS}}</div>
    </section>"##;

const GLUCOSE_SCRIPT: &str = r##"  <script>
    const timeInput = document.getElementById('time-input');
    const renderedTime = document.getElementById('rendered-time');

    const markManual = (body) =>
      fetch('/api/glicemia/time', {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify(body)
      }).then(() => {
        timeInput.dataset.manual = 'true';
      });

    timeInput.addEventListener('focus', () => {
      if (timeInput.dataset.manual !== 'true') {
        markManual({}).catch(() => {});
      }
    });

    timeInput.addEventListener('change', () => {
      markManual({ time: timeInput.value }).catch(() => {});
    });

    setInterval(async () => {
      if (timeInput.dataset.manual === 'true' || document.activeElement === timeInput) {
        return;
      }
      const res = await fetch('/api/glicemia');
      if (res.ok) {
        const page = await res.json();
        timeInput.value = page.form.time;
        renderedTime.value = page.form.time;
      }
    }, 60000);
  </script>"##;

const HISTORY_HTML: &str = r##"    <section class="card wide">
      <h1>Histórico de Medições</h1>
      <form class="filters" id="range-form" method="get" action="/historico">
        <label>
          Data Início
          <input type="date" name="startDate" value="{{START}}" />
        </label>
        <label>
          Data Fim
          <input type="date" name="endDate" value="{{END}}" />
        </label>
      </form>
      <form method="post" action="/historico/atualizar" data-once>
        <input type="hidden" name="startDate" value="{{START}}" />
        <input type="hidden" name="endDate" value="{{END}}" />
        <button class="secondary" type="submit">Atualizar</button>
      </form>
      {{LOADING}}
      {{ERROR}}
      <table>
        <thead>
          <tr>
            <th>Data</th>
            <th>Horário</th>
            <th>Sistólica</th>
            <th>Diastólica</th>
            <th>Pulso</th>
            <th>Glicemia</th>
          </tr>
        </thead>
        <tbody>
          {{ROWS}}
        </tbody>
      </table>
    </section>

    <section class="card wide chart-card">
      <div class="legend" id="chart-legend"></div>
      <svg id="chart" viewBox="0 0 720 320" role="img" aria-label="Gráfico de medições"></svg>
    </section>"##;

const HISTORY_SCRIPT: &str = r##"  <script>
    const chartData = {{CHART_JSON}};
    const chartEl = document.getElementById('chart');
    const legendEl = document.getElementById('chart-legend');

    document.querySelectorAll('#range-form input').forEach((input) => {
      input.addEventListener('change', () => input.form.submit());
    });

    const escapeText = (text) =>
      String(text).replace(/[&<>"]/g, (ch) => ({ '&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;' })[ch]);

    const formatAxisValue = (value) => {
      const rounded = Math.round(value * 10) / 10;
      return Number.isInteger(rounded) ? rounded.toString() : rounded.toFixed(1);
    };

    const renderChart = ({ labels, series, palette }) => {
      legendEl.innerHTML = series
        .map((line) => `<span style="--swatch: ${line.color}; color: ${palette.axis}">${escapeText(line.name)}</span>`)
        .join('');

      const values = series.flatMap((line) => line.points.filter((value) => typeof value === 'number'));
      if (!labels.length || !values.length) {
        chartEl.innerHTML = `<text x="50%" y="50%" text-anchor="middle" fill="${palette.axis}">Sem dados para exibir</text>`;
        return;
      }

      const width = 720;
      const height = 320;
      const paddingX = 48;
      const paddingY = 36;
      const top = 20;

      let min = Math.min(...values);
      let max = Math.max(...values);
      if (min === max) {
        min -= 1;
        max += 1;
      }

      const range = max - min;
      const xStep = labels.length > 1 ? (width - paddingX * 2) / (labels.length - 1) : 0;
      const scaleY = (height - top - paddingY) / range;
      const x = (index) => (labels.length > 1 ? paddingX + index * xStep : width / 2);
      const y = (value) => height - paddingY - (value - min) * scaleY;

      const ticks = 4;
      let grid = '';
      for (let i = 0; i <= ticks; i += 1) {
        const value = min + (range * i) / ticks;
        const yPos = y(value);
        grid += `<line x1="${paddingX}" y1="${yPos}" x2="${width - paddingX}" y2="${yPos}" stroke="${palette.grid}" stroke-dasharray="3 3" />`;
        grid += `<text x="${paddingX - 8}" y="${yPos + 4}" text-anchor="end" fill="${palette.axis}" font-size="12" font-weight="bold">${formatAxisValue(value)}</text>`;
      }

      const lines = series
        .map((line) => {
          let path = '';
          let drawing = false;
          let dots = '';
          line.points.forEach((value, index) => {
            if (typeof value !== 'number') {
              drawing = false;
              return;
            }
            path += `${drawing ? 'L' : 'M'} ${x(index).toFixed(2)} ${y(value).toFixed(2)} `;
            drawing = true;
            dots += `<circle cx="${x(index)}" cy="${y(value)}" r="4" fill="${line.color}"><title>${escapeText(line.name)}: ${value} (${escapeText(labels[index])})</title></circle>`;
          });
          return `<path d="${path}" fill="none" stroke="${line.color}" stroke-width="2" />${dots}`;
        })
        .join('');

      const labelEvery = Math.max(1, Math.ceil(labels.length / 8));
      const xLabels = labels
        .map((label, index) => {
          if (index % labelEvery !== 0) {
            return '';
          }
          return `<text x="${x(index)}" y="${height - paddingY + 18}" text-anchor="middle" fill="${palette.axis}" font-size="12" font-weight="bold">${escapeText(label)}</text>`;
        })
        .join('');

      const axis = `<line x1="${paddingX}" y1="${height - paddingY}" x2="${width - paddingX}" y2="${height - paddingY}" stroke="${palette.axis}" />`;

      chartEl.innerHTML = `${grid}${axis}${lines}${xLabels}`;
    };

    renderChart(chartData);
  </script>"##;
