use indexmap::IndexMap;
use serde_json::Value;

/// Declaration of a resource's fields, in the order they're declared.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Schema {
    attributes: IndexMap<&'static str, Attribute>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &'static str, attribute: Attribute) -> Self {
        self.attributes.insert(name, attribute);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Attribute)> {
        self.attributes.iter().map(|(name, attr)| (*name, attr))
    }

    /// Returns names of immutable attributes whose values differ between
    /// given states; any such change means the resource has to be replaced
    /// instead of updated.
    pub fn requires_replacement(&self, prior: &Value, declared: &Value) -> Vec<&'static str> {
        self.attributes
            .iter()
            .filter(|(_, attr)| attr.immutable)
            .filter(|(name, attr)| {
                let prior = attr.effective(prior.get(**name));
                let declared = attr.effective(declared.get(**name));

                prior != declared
            })
            .map(|(name, _)| *name)
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub kind: AttributeKind,
    pub required: bool,
    pub immutable: bool,
    pub default: Option<&'static str>,
    pub allowed_values: Vec<&'static str>,
}

impl Attribute {
    fn new(kind: AttributeKind) -> Self {
        Self {
            kind,
            required: false,
            immutable: false,
            default: None,
            allowed_values: Default::default(),
        }
    }

    pub fn string() -> Self {
        Self::new(AttributeKind::String)
    }

    pub fn map() -> Self {
        Self::new(AttributeKind::Map)
    }

    pub fn set(element: Schema) -> Self {
        Self::new(AttributeKind::Set(element))
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn immutable(mut self) -> Self {
        self.immutable = true;
        self
    }

    pub fn default(mut self, value: &'static str) -> Self {
        self.default = Some(value);
        self
    }

    pub fn one_of(mut self, values: impl IntoIterator<Item = &'static str>) -> Self {
        self.allowed_values = values.into_iter().collect();
        self
    }

    fn effective(&self, value: Option<&Value>) -> Value {
        match (value, self.default) {
            (None | Some(Value::Null), Some(default)) => Value::String(default.into()),
            (Some(Value::String(value)), Some(default)) if value.is_empty() => {
                Value::String(default.into())
            }
            (None, None) => Value::Null,
            (Some(value), _) => value.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttributeKind {
    String,
    Map,
    Set(Schema),
}
