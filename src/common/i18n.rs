// src/common/i18n.rs

use std::{collections::HashMap, sync::Arc};

pub const DEFAULT_LANG: &str = "es";

// Catálogos embebidos en el binario.
const CATALOGS: [(&str, &str); 2] = [
    ("es", include_str!("../../locales/es.json")),
    ("en", include_str!("../../locales/en.json")),
];

/// Catálogo de mensajes por idioma. Los textos admiten parámetros `{nombre}`.
#[derive(Clone, Debug)]
pub struct I18nStore {
    catalogs: Arc<HashMap<String, HashMap<String, String>>>,
}

impl I18nStore {
    pub fn load() -> anyhow::Result<Self> {
        let mut catalogs = HashMap::new();
        for (lang, raw) in CATALOGS {
            let messages: HashMap<String, String> = serde_json::from_str(raw)
                .map_err(|e| anyhow::anyhow!("Catálogo '{}' inválido: {}", lang, e))?;
            catalogs.insert(lang.to_string(), messages);
        }
        Ok(Self { catalogs: Arc::new(catalogs) })
    }

    /// Busca la clave en el idioma pedido, luego en español; si no existe devuelve la clave.
    pub fn translate(&self, lang: &str, key: &str) -> String {
        self.catalogs
            .get(lang)
            .and_then(|messages| messages.get(key))
            .or_else(|| self.catalogs.get(DEFAULT_LANG).and_then(|m| m.get(key)))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    pub fn translate_with(&self, lang: &str, key: &str, params: &[(&str, String)]) -> String {
        params
            .iter()
            .fold(self.translate(lang, key), |text, (name, value)| {
                text.replace(&format!("{{{}}}", name), value)
            })
    }
}

impl Default for I18nStore {
    fn default() -> Self {
        // Los catálogos se validan en las pruebas; uno corrupto deja el almacén vacío.
        Self::load().unwrap_or_else(|e| {
            tracing::error!("{}", e);
            Self { catalogs: Arc::new(HashMap::new()) }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_catalogs_parse_and_share_keys() {
        let store = I18nStore::load().expect("catálogos válidos");
        let es = &store.catalogs["es"];
        let en = &store.catalogs["en"];
        for key in es.keys() {
            assert!(en.contains_key(key), "falta la clave '{}' en en.json", key);
        }
    }

    #[test]
    fn unknown_language_falls_back_to_spanish() {
        let store = I18nStore::default();
        assert_eq!(
            store.translate("fr", "error.forbidden"),
            store.translate("es", "error.forbidden")
        );
    }

    #[test]
    fn unknown_key_is_returned_verbatim() {
        let store = I18nStore::default();
        assert_eq!(store.translate("es", "no.existe"), "no.existe");
    }

    #[test]
    fn parameters_are_interpolated() {
        let store = I18nStore::default();
        let text = store.translate_with("en", "error.unique_violation", &[("detail", "campuses_code".into())]);
        assert!(text.contains("campuses_code"));
    }
}
