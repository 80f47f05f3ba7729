//! # Schema Nodes
//!
//! A raw JSON schema is parsed once into a [`SchemaNode`] tree before any
//! value is validated, so the validator never re-inspects raw maps while it
//! recurses. Parsing is also where well-formedness is enforced: a facet of
//! the wrong JSON type, a bound pair no value can satisfy, or a node mixing
//! `type` with a combinator is rejected here, addressed at the offending
//! keyword (`prefix.minimum`, `prefix.oneOf[1].type`, `prefix.enum[2]`).
//!
//! ## Shapes
//!
//! | Shape        | Source keywords                                        |
//! |--------------|--------------------------------------------------------|
//! | `Any`        | no `type`, no combinator, no typed facet               |
//! | `Scalar`     | `boolean`, `integer`, `number`, `string`, `null`       |
//! | `Object`     | `properties`, `required`, `additionalProperties`       |
//! | `Array`      | `items`, `minItems`, `maxItems`, `uniqueItems`         |
//! | `Combinator` | exactly one of `oneOf`, `anyOf`, `allOf`               |
//!
//! A node without `type` takes the type implied by its facets (object
//! keywords first, then array, numeric, and string keywords), which is how
//! OpenAPI documents commonly omit `type: object`. Keywords outside the
//! recognized set (`title`, `description`, `example`, ...) are ignored.

use conform_core::{Context, ValidationError};
use conform_facet::{
    format_number, json_eq, render, type_name, Bound, Format, LengthBounds, NumericRange,
    Pattern,
};
use serde_json::{Map, Value};

use crate::validate::{resolve, resolve_present};

const NUMERIC_KEYWORDS: &[&str] = &[
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "multipleOf",
];
const STRING_KEYWORDS: &[&str] = &["minLength", "maxLength", "pattern"];
const ARRAY_KEYWORDS: &[&str] = &["items", "minItems", "maxItems", "uniqueItems"];
const OBJECT_KEYWORDS: &[&str] = &["properties", "required", "additionalProperties"];

/// Every type-specific facet, in the order foreign facets are reported.
static TYPED_KEYWORDS: [&[&str]; 4] = [
    OBJECT_KEYWORDS,
    ARRAY_KEYWORDS,
    NUMERIC_KEYWORDS,
    STRING_KEYWORDS,
];

// ─── Model ───────────────────────────────────────────────────────────

/// A boolean composition of branch schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombinatorKind {
    /// Exactly one branch must match.
    OneOf,
    /// At least one branch must match; the first match wins.
    AnyOf,
    /// Every branch must match; object results are deep-merged.
    AllOf,
}

impl CombinatorKind {
    /// All combinators, in keyword precedence order.
    pub const ALL: [CombinatorKind; 3] = [
        CombinatorKind::OneOf,
        CombinatorKind::AnyOf,
        CombinatorKind::AllOf,
    ];

    /// The schema keyword for this combinator.
    pub fn keyword(self) -> &'static str {
        match self {
            CombinatorKind::OneOf => "oneOf",
            CombinatorKind::AnyOf => "anyOf",
            CombinatorKind::AllOf => "allOf",
        }
    }
}

/// Attributes every node may carry regardless of its shape.
#[derive(Debug, Clone, Default)]
pub struct Common {
    /// Whether `null` is an accepted value.
    pub nullable: bool,
    /// Normalized default, substituted for absent and `null` values.
    pub default: Option<Value>,
    /// Ordered allow-list of normalized literals.
    pub enumeration: Option<Vec<Value>>,
}

/// Facets of a `string` node.
#[derive(Debug, Clone, Default)]
pub struct StringFacets {
    /// `minLength`/`maxLength`.
    pub length: LengthBounds,
    /// `pattern`, full-match.
    pub pattern: Option<Pattern>,
    /// `format`, when it names a format we validate.
    pub format: Option<Format>,
}

/// A primitive node.
#[derive(Debug, Clone)]
pub enum Scalar {
    /// `true` or `false`.
    Boolean,
    /// An integral number within the range.
    Integer(NumericRange),
    /// Any number within the range, compared with [`NUMERIC_EPSILON`](conform_facet::NUMERIC_EPSILON) slack.
    Number(NumericRange),
    /// A string, trimmed before its facets are checked.
    String(StringFacets),
    /// Only `null`.
    Null,
}

impl Scalar {
    /// The schema type name.
    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::Boolean => "boolean",
            Scalar::Integer(_) => "integer",
            Scalar::Number(_) => "number",
            Scalar::String(_) => "string",
            Scalar::Null => "null",
        }
    }
}

/// Policy for keys not declared in `properties`.
#[derive(Debug, Clone)]
pub enum Additional {
    /// Undeclared keys are copied through unchecked. The default.
    Allow,
    /// `additionalProperties: false`. Any undeclared key fails.
    Deny,
    /// Undeclared keys are validated against this schema.
    Schema(Box<SchemaNode>),
}

/// An `object` node.
#[derive(Debug, Clone)]
pub struct ObjectSchema {
    /// Declared properties in declaration order.
    pub properties: Vec<(String, SchemaNode)>,
    /// Names of required properties.
    pub required: Vec<String>,
    /// `additionalProperties`.
    pub additional: Additional,
}

impl ObjectSchema {
    /// The declared schema for property `name`.
    pub fn property(&self, name: &str) -> Option<&SchemaNode> {
        self.properties
            .iter()
            .find(|(declared, _)| declared == name)
            .map(|(_, node)| node)
    }

    /// Whether property `name` is required.
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }
}

/// An `array` node.
#[derive(Debug, Clone)]
pub struct ArraySchema {
    /// Schema applied to every element. Without it elements are unchecked.
    pub items: Option<Box<SchemaNode>>,
    /// `minItems`.
    pub min_items: Option<usize>,
    /// `maxItems`.
    pub max_items: Option<usize>,
    /// `uniqueItems`. Duplicates are compared after normalization.
    pub unique_items: bool,
}

/// What a node constrains.
#[derive(Debug, Clone)]
pub enum Shape {
    Any,
    Scalar(Scalar),
    Object(ObjectSchema),
    Array(ArraySchema),
    Combinator(CombinatorKind, Vec<SchemaNode>),
}

/// One parsed schema node.
#[derive(Debug, Clone)]
pub struct SchemaNode {
    pub common: Common,
    pub shape: Shape,
}

impl SchemaNode {
    /// Parse and check the raw schema `raw`, addressing problems below `at`.
    pub fn parse<C: Context>(at: &C, raw: &Value) -> Result<Self, ValidationError> {
        let Value::Object(map) = raw else {
            return Err(at.fail(format!(
                "schema must be an object, found {}",
                type_name(raw)
            )));
        };

        let (declared, type_nullable) = parse_type(at, map)?;
        let nullable = flag(at, map, "nullable")? || type_nullable;

        let shape = match combinator(at, map)? {
            Some(kind) => {
                reject_foreign(at, map, &[], &format!("a '{}' node", kind.keyword()))?;
                Shape::Combinator(kind, branches(at, map, kind)?)
            }
            None => match declared.or_else(|| implied_type(map)) {
                None => Shape::Any,
                Some(ty) => {
                    reject_foreign(at, map, ty.keywords(), &format!("type '{}'", ty.as_str()))?;
                    parse_shape(at, map, ty)?
                }
            },
        };

        let mut node = SchemaNode {
            common: Common {
                nullable,
                ..Common::default()
            },
            shape,
        };
        if let Some(raw_enum) = map.get("enum") {
            node.common.enumeration = Some(parse_enum(at, &node, raw_enum)?);
        }
        if let Some(raw_default) = map.get("default") {
            node.common.default = Some(parse_default(at, &node, raw_default)?);
        }
        Ok(node)
    }

    /// Short label for logs and messages: the type or combinator keyword.
    pub fn type_label(&self) -> &'static str {
        match &self.shape {
            Shape::Any => "any",
            Shape::Scalar(scalar) => scalar.type_name(),
            Shape::Object(_) => "object",
            Shape::Array(_) => "array",
            Shape::Combinator(kind, _) => kind.keyword(),
        }
    }

    /// Whether a string `default` is parsed as JSON text into this node's type.
    fn parses_string_default(&self) -> bool {
        match &self.shape {
            Shape::Scalar(Scalar::String(_)) | Shape::Any | Shape::Combinator(..) => false,
            Shape::Scalar(_) | Shape::Object(_) | Shape::Array(_) => true,
        }
    }
}

// ─── Type ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeName {
    Boolean,
    Integer,
    Number,
    String,
    Object,
    Array,
    Null,
}

impl TypeName {
    const NAMES: &'static str = "boolean, integer, number, string, object, array, null";

    fn parse(name: &str) -> Option<Self> {
        match name {
            "boolean" => Some(TypeName::Boolean),
            "integer" => Some(TypeName::Integer),
            "number" => Some(TypeName::Number),
            "string" => Some(TypeName::String),
            "object" => Some(TypeName::Object),
            "array" => Some(TypeName::Array),
            "null" => Some(TypeName::Null),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            TypeName::Boolean => "boolean",
            TypeName::Integer => "integer",
            TypeName::Number => "number",
            TypeName::String => "string",
            TypeName::Object => "object",
            TypeName::Array => "array",
            TypeName::Null => "null",
        }
    }

    fn keywords(self) -> &'static [&'static str] {
        match self {
            TypeName::Integer | TypeName::Number => NUMERIC_KEYWORDS,
            TypeName::String => STRING_KEYWORDS,
            TypeName::Object => OBJECT_KEYWORDS,
            TypeName::Array => ARRAY_KEYWORDS,
            TypeName::Boolean | TypeName::Null => &[],
        }
    }
}

fn not_a_type<C: Context>(at: &C, raw: &Value) -> ValidationError {
    at.fail(format!(
        "value {} is not one of [{}]",
        render(raw),
        TypeName::NAMES
    ))
}

/// Read `type`, accepting the `["string", "null"]` spelling of a nullable type.
fn parse_type<C: Context>(
    at: &C,
    map: &Map<String, Value>,
) -> Result<(Option<TypeName>, bool), ValidationError> {
    let Some(raw) = map.get("type") else {
        return Ok((None, false));
    };
    let at = at.child("type");
    match raw {
        Value::String(name) => TypeName::parse(name)
            .map(|ty| (Some(ty), false))
            .ok_or_else(|| not_a_type(&at, raw)),
        Value::Array(names) => {
            let mut declared = None;
            let mut nullable = false;
            for (index, name) in names.iter().enumerate() {
                let entry = at.element(index);
                let ty = name
                    .as_str()
                    .and_then(TypeName::parse)
                    .ok_or_else(|| not_a_type(&entry, name))?;
                match ty {
                    TypeName::Null => nullable = true,
                    _ if declared.is_some() => {
                        return Err(entry.fail("only one non-null type may be declared"))
                    }
                    _ => declared = Some(ty),
                }
            }
            match (declared, nullable) {
                (Some(ty), _) => Ok((Some(ty), nullable)),
                (None, true) => Ok((Some(TypeName::Null), false)),
                (None, false) => Err(at.fail("type list must not be empty")),
            }
        }
        other => Err(not_a_type(&at, other)),
    }
}

fn implied_type(map: &Map<String, Value>) -> Option<TypeName> {
    let uses = |keywords: &[&str]| keywords.iter().any(|k| map.contains_key(*k));
    if uses(OBJECT_KEYWORDS) {
        Some(TypeName::Object)
    } else if uses(ARRAY_KEYWORDS) {
        Some(TypeName::Array)
    } else if uses(NUMERIC_KEYWORDS) {
        Some(TypeName::Number)
    } else if uses(STRING_KEYWORDS) {
        Some(TypeName::String)
    } else {
        None
    }
}

fn reject_foreign<C: Context>(
    at: &C,
    map: &Map<String, Value>,
    allowed: &[&str],
    owner: &str,
) -> Result<(), ValidationError> {
    let foreign = TYPED_KEYWORDS
        .iter()
        .flat_map(|group| group.iter())
        .find(|k| map.contains_key(**k) && !allowed.contains(*k));
    match foreign {
        Some(keyword) => Err(at
            .child(keyword)
            .fail(format!("'{keyword}' does not apply to {owner}"))),
        None => Ok(()),
    }
}

// ─── Keyword Readers ─────────────────────────────────────────────────

fn flag<C: Context>(at: &C, map: &Map<String, Value>, keyword: &str) -> Result<bool, ValidationError> {
    match map.get(keyword) {
        None => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(at
            .child(keyword)
            .fail(format!("value {} is not a boolean", render(other)))),
    }
}

fn number<C: Context>(
    at: &C,
    map: &Map<String, Value>,
    keyword: &str,
) -> Result<Option<f64>, ValidationError> {
    map.get(keyword)
        .map(|raw| {
            raw.as_f64().ok_or_else(|| {
                at.child(keyword)
                    .fail(format!("value {} is not a number", render(raw)))
            })
        })
        .transpose()
}

fn count<C: Context>(
    at: &C,
    map: &Map<String, Value>,
    keyword: &str,
) -> Result<Option<usize>, ValidationError> {
    map.get(keyword)
        .map(|raw| {
            raw.as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| {
                    at.child(keyword)
                        .fail(format!("value {} is not a non-negative integer", render(raw)))
                })
        })
        .transpose()
}

fn ordered<C: Context>(
    at: &C,
    (min_keyword, min): (&str, Option<usize>),
    (max_keyword, max): (&str, Option<usize>),
) -> Result<(), ValidationError> {
    match (min, max) {
        (Some(lo), Some(hi)) if lo > hi => Err(at
            .child(max_keyword)
            .fail(format!("{max_keyword} {hi} is less than {min_keyword} {lo}"))),
        _ => Ok(()),
    }
}

// ─── Shapes ──────────────────────────────────────────────────────────

fn parse_shape<C: Context>(
    at: &C,
    map: &Map<String, Value>,
    ty: TypeName,
) -> Result<Shape, ValidationError> {
    Ok(match ty {
        TypeName::Boolean => Shape::Scalar(Scalar::Boolean),
        TypeName::Null => Shape::Scalar(Scalar::Null),
        TypeName::Integer => Shape::Scalar(Scalar::Integer(parse_range(at, map)?)),
        TypeName::Number => Shape::Scalar(Scalar::Number(parse_range(at, map)?)),
        TypeName::String => Shape::Scalar(Scalar::String(parse_string(at, map)?)),
        TypeName::Object => Shape::Object(parse_object(at, map)?),
        TypeName::Array => Shape::Array(parse_array(at, map)?),
    })
}

/// The stricter of two bounds on the same side of a range.
fn tighter(a: Bound, b: Bound, lower: bool) -> Bound {
    if a.limit == b.limit {
        return if b.exclusive { b } else { a };
    }
    let a_wins = if lower { a.limit > b.limit } else { a.limit < b.limit };
    if a_wins {
        a
    } else {
        b
    }
}

/// Read one side of a range. `exclusive_keyword` may be a draft-4 boolean
/// flag on `base` or a draft-6 numeric bound of its own.
fn bound<C: Context>(
    at: &C,
    map: &Map<String, Value>,
    base: &str,
    exclusive_keyword: &str,
    lower: bool,
) -> Result<Option<Bound>, ValidationError> {
    let limit = number(at, map, base)?;
    match map.get(exclusive_keyword) {
        None => Ok(limit.map(Bound::inclusive)),
        Some(Value::Bool(exclusive)) => match limit {
            Some(limit) => Ok(Some(Bound {
                limit,
                exclusive: *exclusive,
            })),
            None if !exclusive => Ok(None),
            None => Err(at
                .child(exclusive_keyword)
                .fail(format!("'{exclusive_keyword}' requires '{base}'"))),
        },
        Some(Value::Number(n)) => {
            let own = n.as_f64().map(Bound::exclusive).ok_or_else(|| {
                at.child(exclusive_keyword)
                    .fail(format!("value {n} is not a number"))
            })?;
            Ok(Some(match limit {
                Some(limit) => tighter(Bound::inclusive(limit), own, lower),
                None => own,
            }))
        }
        Some(other) => Err(at.child(exclusive_keyword).fail(format!(
            "value {} is not a boolean or number",
            render(other)
        ))),
    }
}

fn parse_range<C: Context>(
    at: &C,
    map: &Map<String, Value>,
) -> Result<NumericRange, ValidationError> {
    let mut range = NumericRange::new();
    range.min = bound(at, map, "minimum", "exclusiveMinimum", true)?;
    range.max = bound(at, map, "maximum", "exclusiveMaximum", false)?;

    if let Some(step) = number(at, map, "multipleOf")? {
        if step <= 0.0 {
            return Err(at
                .child("multipleOf")
                .fail(format!("value {} must be greater than 0", format_number(step))));
        }
        range.multiple_of = Some(step);
    }

    if let (false, Some(lo), Some(hi)) = (range.is_satisfiable(), range.min, range.max) {
        let keyword = if map.contains_key("minimum") {
            "minimum"
        } else {
            "exclusiveMinimum"
        };
        return Err(at.child(keyword).fail(format!(
            "minimum {} is not compatible with maximum {}",
            format_number(lo.limit),
            format_number(hi.limit)
        )));
    }
    Ok(range)
}

fn parse_string<C: Context>(
    at: &C,
    map: &Map<String, Value>,
) -> Result<StringFacets, ValidationError> {
    let min = count(at, map, "minLength")?;
    let max = count(at, map, "maxLength")?;
    ordered(at, ("minLength", min), ("maxLength", max))?;

    let pattern = match map.get("pattern") {
        None => None,
        Some(Value::String(source)) => {
            Some(Pattern::new(source).map_err(|e| at.child("pattern").fail_with(e))?)
        }
        Some(other) => {
            return Err(at
                .child("pattern")
                .fail(format!("value {} is not a string", render(other))))
        }
    };

    let format = match map.get("format") {
        None => None,
        Some(Value::String(keyword)) => Format::from_keyword(keyword),
        Some(other) => {
            return Err(at
                .child("format")
                .fail(format!("value {} is not a string", render(other))))
        }
    };

    Ok(StringFacets {
        length: LengthBounds { min, max },
        pattern,
        format,
    })
}

fn parse_object<C: Context>(
    at: &C,
    map: &Map<String, Value>,
) -> Result<ObjectSchema, ValidationError> {
    let properties = match map.get("properties") {
        None => Vec::new(),
        Some(Value::Object(declared)) => declared
            .iter()
            .map(|(name, raw)| {
                SchemaNode::parse(&at.child(name), raw).map(|node| (name.clone(), node))
            })
            .collect::<Result<Vec<_>, ValidationError>>()?,
        Some(other) => {
            return Err(at.child("properties").fail(format!(
                "value {} is not an object of schemas",
                render(other)
            )))
        }
    };

    let required = match map.get("required") {
        None => Vec::new(),
        Some(Value::Array(names)) => names
            .iter()
            .enumerate()
            .map(|(index, name)| {
                name.as_str().map(str::to_string).ok_or_else(|| {
                    at.child_element("required", index)
                        .fail(format!("value {} is not a property name", render(name)))
                })
            })
            .collect::<Result<Vec<_>, ValidationError>>()?,
        Some(other) => {
            return Err(at
                .child("required")
                .fail(format!("value {} is not a list of names", render(other))))
        }
    };

    let additional = match map.get("additionalProperties") {
        None | Some(Value::Bool(true)) => Additional::Allow,
        Some(Value::Bool(false)) => Additional::Deny,
        Some(raw @ Value::Object(_)) => Additional::Schema(Box::new(SchemaNode::parse(
            &at.child("additionalProperties"),
            raw,
        )?)),
        Some(other) => {
            return Err(at.child("additionalProperties").fail(format!(
                "value {} is not a boolean or schema",
                render(other)
            )))
        }
    };

    Ok(ObjectSchema {
        properties,
        required,
        additional,
    })
}

fn parse_array<C: Context>(
    at: &C,
    map: &Map<String, Value>,
) -> Result<ArraySchema, ValidationError> {
    let items = match map.get("items") {
        None => None,
        Some(raw @ Value::Object(_)) => {
            Some(Box::new(SchemaNode::parse(&at.child("items"), raw)?))
        }
        Some(other) => {
            return Err(at
                .child("items")
                .fail(format!("value {} is not a schema", render(other))))
        }
    };
    let min_items = count(at, map, "minItems")?;
    let max_items = count(at, map, "maxItems")?;
    let unique_items = flag(at, map, "uniqueItems")?;
    ordered(at, ("minItems", min_items), ("maxItems", max_items))?;

    let has_facets = ["minItems", "maxItems", "uniqueItems"]
        .iter()
        .any(|k| map.contains_key(*k));
    if items.is_none() && has_facets {
        return Err(at
            .child("items")
            .fail("'items' is required when array facets are present"));
    }

    Ok(ArraySchema {
        items,
        min_items,
        max_items,
        unique_items,
    })
}

// ─── Combinators ─────────────────────────────────────────────────────

fn combinator<C: Context>(
    at: &C,
    map: &Map<String, Value>,
) -> Result<Option<CombinatorKind>, ValidationError> {
    let mut found: Option<CombinatorKind> = None;
    for kind in CombinatorKind::ALL {
        if !map.contains_key(kind.keyword()) {
            continue;
        }
        if let Some(first) = found {
            return Err(at.child(kind.keyword()).fail(format!(
                "'{}' cannot be combined with '{}'",
                kind.keyword(),
                first.keyword()
            )));
        }
        found = Some(kind);
    }
    if let (Some(kind), true) = (found, map.contains_key("type")) {
        return Err(at
            .child("type")
            .fail(format!("'type' cannot be combined with '{}'", kind.keyword())));
    }
    Ok(found)
}

fn branches<C: Context>(
    at: &C,
    map: &Map<String, Value>,
    kind: CombinatorKind,
) -> Result<Vec<SchemaNode>, ValidationError> {
    let at = at.child(kind.keyword());
    match map.get(kind.keyword()) {
        Some(Value::Array(raw)) if !raw.is_empty() => raw
            .iter()
            .enumerate()
            .map(|(index, branch)| SchemaNode::parse(&at.element(index), branch))
            .collect(),
        Some(Value::Array(_)) => Err(at.fail("must contain at least one schema")),
        _ => Err(at.fail("must be a list of schemas")),
    }
}

// ─── Enum and Default ────────────────────────────────────────────────

/// Check every `enum` member against the node and normalize it.
fn parse_enum<C: Context>(
    at: &C,
    node: &SchemaNode,
    raw: &Value,
) -> Result<Vec<Value>, ValidationError> {
    let at = at.child("enum");
    let Value::Array(members) = raw else {
        return Err(at.fail(format!("value {} is not a list", render(raw))));
    };
    if members.is_empty() {
        return Err(at.fail("must not be empty"));
    }

    let mut allowed: Vec<Value> = Vec::with_capacity(members.len());
    for (index, member) in members.iter().enumerate() {
        let entry = at.element(index);
        let normalized = resolve_present(node, &entry, member)?;
        if allowed.iter().any(|seen| json_eq(seen, &normalized)) {
            return Err(entry.fail(format!("duplicate enum value {}", render(member))));
        }
        allowed.push(normalized);
    }
    Ok(allowed)
}

/// Parse `default` into the node's type and check it like any other value.
///
/// A string default on a non-string node is JSON text: `"0"` on an integer
/// node becomes `0`, `"[]"` on an array node becomes `[]`.
fn parse_default<C: Context>(
    at: &C,
    node: &SchemaNode,
    raw: &Value,
) -> Result<Value, ValidationError> {
    let at = at.child("default");
    let candidate = match raw {
        Value::String(text) if node.parses_string_default() => {
            serde_json::from_str(text).map_err(|e| {
                ValidationError::with_cause(
                    at.error_code(),
                    format!("value '{text}' is not a valid {}", node.type_label()),
                    e,
                )
            })?
        }
        other => other.clone(),
    };
    Ok(resolve(node, &at, Some(&candidate), true)?.unwrap_or(Value::Null))
}
