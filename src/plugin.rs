//! Per-field value transformers applied just before a value is written into
//! its cell.

use std::fmt;
use std::sync::Arc;

/// A named per-field display transformer. `fields` holds the field names the
/// plugin covers (map-shaped field names or synthetic `dataN` keys for
/// array-shaped rows).
#[derive(Clone)]
pub struct Plugin {
    pub name: String,
    pub fields: Vec<String>,
    transform: Arc<dyn Fn(&str) -> String + Send + Sync>,
}

impl Plugin {
    pub fn new(
        name: impl Into<String>,
        fields: Vec<String>,
        transform: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            fields,
            transform: Arc::new(transform),
        }
    }

    /// Convenience for a plugin covering a single field.
    pub fn for_field(
        name: impl Into<String>,
        field: impl Into<String>,
        transform: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        Self::new(name, vec![field.into()], transform)
    }

    pub fn applies_to(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    pub fn transform(&self, value: &str) -> String {
        (self.transform)(value)
    }
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

/// Registered plugins, applied in registration order.
#[derive(Clone, Debug, Default)]
pub struct PluginSet {
    plugins: Vec<Plugin>,
}

impl PluginSet {
    pub fn register(&mut self, plugin: Plugin) {
        self.plugins.push(plugin);
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Run every plugin covering `field` over `value`, chaining outputs in
    /// registration order.
    pub fn apply(&self, field: &str, value: String) -> String {
        self.plugins
            .iter()
            .filter(|p| p.applies_to(field))
            .fold(value, |v, p| p.transform(&v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_only_matching_fields() {
        let mut set = PluginSet::default();
        set.register(Plugin::for_field("upper", "name", |v| v.to_uppercase()));
        assert_eq!(set.apply("name", "ann".into()), "ANN");
        assert_eq!(set.apply("id", "ann".into()), "ann");
    }

    #[test]
    fn apply_chains_in_registration_order() {
        let mut set = PluginSet::default();
        set.register(Plugin::for_field("excl", "v", |v| format!("{v}!")));
        set.register(Plugin::for_field("paren", "v", |v| format!("({v})")));
        assert_eq!(set.apply("v", "x".into()), "(x!)");
    }

    #[test]
    fn plugin_may_cover_several_fields() {
        let p = Plugin::new("dash", vec!["a".into(), "b".into()], |v| {
            format!("-{v}-")
        });
        assert!(p.applies_to("a"));
        assert!(p.applies_to("b"));
        assert!(!p.applies_to("c"));
        assert_eq!(p.transform("x"), "-x-");
    }
}
