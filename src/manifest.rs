//! Metadata that makes the app installable.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ManifestIcon {
    pub src: &'static str,
    pub sizes: &'static str,
    #[serde(rename = "type")]
    pub mime: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WebManifest {
    pub name: &'static str,
    pub short_name: &'static str,
    pub description: &'static str,
    pub start_url: &'static str,
    pub scope: &'static str,
    pub display: &'static str,
    pub orientation: &'static str,
    pub background_color: &'static str,
    pub theme_color: &'static str,
    pub icons: Vec<ManifestIcon>,
}

pub const APP_NAME: &str = "Saúde Diária";
pub const THEME_COLOR: &str = "#1a73e8";

const ICONS: [(&str, &str, Option<&str>); 8] = [
    ("/pwa-images/android/android-launchericon-48-48.png", "48x48", None),
    ("/pwa-images/android/android-launchericon-72-72.png", "72x72", None),
    ("/pwa-images/android/android-launchericon-96-96.png", "96x96", None),
    ("/pwa-images/android/android-launchericon-144-144.png", "144x144", None),
    ("/pwa-images/android/android-launchericon-192-192.png", "192x192", Some("any maskable")),
    ("/pwa-images/android/android-launchericon-512-512.png", "512x512", Some("any maskable")),
    ("/pwa-images/ios/180.png", "180x180", None),
    ("/pwa-images/ios/512.png", "512x512", None),
];

pub fn web_manifest() -> WebManifest {
    let icons = ICONS
        .iter()
        .map(|&(src, sizes, purpose)| ManifestIcon {
            src,
            sizes,
            mime: "image/png",
            purpose,
        })
        .collect();

    WebManifest {
        name: APP_NAME,
        short_name: "Saúde",
        description: "Aplicativo para acompanhamento de saúde diária",
        start_url: "/",
        scope: "/",
        display: "standalone",
        orientation: "portrait",
        background_color: "#202124",
        theme_color: THEME_COLOR,
        icons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_is_standalone_with_icons() {
        let value = serde_json::to_value(web_manifest()).unwrap();
        assert_eq!(value["display"], "standalone");
        assert_eq!(value["short_name"], "Saúde");
        assert_eq!(value["icons"].as_array().unwrap().len(), 8);
        assert_eq!(value["icons"][0]["type"], "image/png");
        assert!(value["icons"][0].get("purpose").is_none());
        assert_eq!(value["icons"][4]["purpose"], "any maskable");
    }
}
