//! Declarative field validation shared by the resource handlers.
//!
//! Each handler states its schema as an array of `Field`s, one per inbound
//! value, and evaluates it uniformly here instead of re-deriving per-field
//! checks inline. The contract for every string field is the same: string
//! typed, and non-empty after trimming whitespace (or an exact length where
//! a format demands one).

/// Constraint a field must satisfy after whitespace trimming.
#[derive(Clone, Copy, Debug)]
pub enum Rule {
    /// Any non-empty string.
    NonEmpty,
    /// A string of exactly this many characters, e.g. ISO 3166-1 alpha-2
    /// country codes.
    Exact(usize),
}

/// An inbound value paired with the rule it must satisfy.
#[derive(Debug)]
pub struct Field<'a> {
    value: Option<&'a str>,
    rule: Rule,
}

impl<'a> Field<'a> {
    #[must_use]
    pub const fn new(value: Option<&'a str>, rule: Rule) -> Self {
        Self { value, rule }
    }

    /// The trimmed value when the rule holds, `None` otherwise.
    fn eval(&self) -> Option<String> {
        let trimmed = self.value?.trim();
        let holds = match self.rule {
            Rule::NonEmpty => !trimmed.is_empty(),
            Rule::Exact(len) => trimmed.chars().count() == len,
        };
        holds.then(|| trimmed.to_string())
    }
}

/// Evaluate a required-field schema. Every field must pass; the result
/// destructures positionally into the declared order.
#[must_use]
pub fn require_all<const N: usize>(schema: [Field<'_>; N]) -> Option<[String; N]> {
    let mut values = Vec::with_capacity(N);
    for field in &schema {
        values.push(field.eval()?);
    }
    values.try_into().ok()
}

/// Evaluate an optional-field schema. Fields that fail their rule are simply
/// absent from the result.
#[must_use]
pub fn optional<const N: usize>(schema: [Field<'_>; N]) -> [Option<String>; N] {
    schema.map(|field| field.eval())
}
