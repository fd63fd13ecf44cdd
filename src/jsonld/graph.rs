use crate::error::{Error, Result};
use crate::jsonld::{is_absolute, parse_prefix, ContextLoader};
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;

/// Remote contexts may reference further contexts; stop after this many hops
const MAX_CONTEXT_DEPTH: usize = 8;
const MAX_TERM_DEPTH: usize = 16;

/// A resolved JSON-LD node with expanded names
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    pub id: Option<String>,
    pub types: Vec<String>,
    pub properties: Vec<(String, Vec<NodeValue>)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeValue {
    Node(Node),
    Literal {
        value: String,
        language: Option<String>,
        datatype: Option<String>,
    },
}

#[derive(Debug, Clone, Default)]
struct TermDefinition {
    id: Option<String>,
    type_id: bool,
    language: Option<Option<String>>,
}

#[derive(Debug, Clone, Default)]
struct ActiveContext {
    vocab: Option<String>,
    base: Option<String>,
    language: Option<String>,
    terms: HashMap<String, TermDefinition>,
}

impl ActiveContext {
    /// Expand a term, compact IRI or relative name to a full IRI.
    ///
    /// Names that cannot be expanded are returned unchanged.
    fn expand(&self, value: &str, vocab: bool) -> String {
        self.expand_at(value, vocab, 0)
    }

    fn expand_at(&self, value: &str, vocab: bool, depth: usize) -> String {
        if value.starts_with('@') || value.starts_with("_:") || depth > MAX_TERM_DEPTH {
            return value.to_string();
        }

        if vocab {
            if let Some(id) = self.terms.get(value).and_then(|t| t.id.as_deref()) {
                if id != value {
                    return self.expand_at(id, true, depth + 1);
                }
            }
        }

        if let Some((prefix, suffix)) = parse_prefix(value) {
            if let Some(id) = self.terms.get(prefix).and_then(|t| t.id.as_deref()) {
                if id != prefix {
                    return format!("{}{}", self.expand_at(id, true, depth + 1), suffix);
                }
            }
        }

        if is_absolute(value) {
            return value.to_string();
        }

        match (vocab, &self.vocab, &self.base) {
            (true, Some(v), _) => format!("{}{}", v, value),
            (false, _, Some(base)) => url::Url::parse(base)
                .and_then(|b| b.join(value))
                .map(|u| u.to_string())
                .unwrap_or_else(|_| value.to_string()),
            _ => value.to_string(),
        }
    }

    fn term(&self, key: &str) -> Option<&TermDefinition> {
        self.terms.get(key)
    }
}

/// Resolves JSON-LD documents into node trees.
///
/// This is not a conforming JSON-LD processor: terms that cannot be expanded
/// are kept as written instead of being dropped, and nested nodes stay nested
/// instead of being flattened into a node map.
pub struct GraphResolver<'a> {
    loader: &'a mut dyn ContextLoader,
    blank_nodes: usize,
}

impl<'a> GraphResolver<'a> {
    pub fn new(loader: &'a mut dyn ContextLoader) -> Self {
        Self {
            loader,
            blank_nodes: 0,
        }
    }

    /// Resolve one root object. A root with `@graph` yields its members,
    /// otherwise the root itself is the only node.
    pub fn resolve(&mut self, root: &JsonValue) -> Result<Vec<Node>> {
        let obj = root.as_object().ok_or_else(|| Error::Json {
            message: "JSON-LD root must be an object".to_string(),
        })?;

        let ctx = match obj.get("@context") {
            Some(context) => self.process_context(ActiveContext::default(), context, 0)?,
            None => ActiveContext::default(),
        };

        let graph = obj
            .iter()
            .find(|(k, _)| ctx.expand(k, true) == "@graph")
            .map(|(_, v)| v);

        match graph {
            Some(members) => {
                let members = members.as_array().map(Vec::as_slice).unwrap_or(std::slice::from_ref(members));
                let mut nodes = Vec::with_capacity(members.len());
                for member in members {
                    if let JsonValue::Object(member) = member {
                        nodes.push(self.node(&ctx, member)?);
                    }
                }
                Ok(nodes)
            }
            None => Ok(vec![self.node(&ctx, obj)?]),
        }
    }

    fn process_context(
        &mut self,
        mut ctx: ActiveContext,
        context: &JsonValue,
        depth: usize,
    ) -> Result<ActiveContext> {
        match context {
            JsonValue::Null => Ok(ActiveContext::default()),
            JsonValue::String(url) => {
                if depth >= MAX_CONTEXT_DEPTH {
                    return Err(Error::ContextLoad {
                        url: url.clone(),
                        message: "too many nested remote contexts".to_string(),
                    });
                }
                let document = self.loader.load(url)?;
                let inner = document.get("@context").unwrap_or(&document).clone();
                self.process_context(ctx, &inner, depth + 1)
            }
            JsonValue::Array(contexts) => {
                for context in contexts {
                    ctx = self.process_context(ctx, context, depth)?;
                }
                Ok(ctx)
            }
            JsonValue::Object(table) => {
                self.loader.observe_inline(context);
                define_terms(&mut ctx, table);
                Ok(ctx)
            }
            _ => Err(Error::Json {
                message: format!("invalid @context value: {}", context),
            }),
        }
    }

    fn node(&mut self, ctx: &ActiveContext, obj: &Map<String, JsonValue>) -> Result<Node> {
        let local;
        let ctx = match obj.get("@context") {
            Some(context) => {
                local = self.process_context(ctx.clone(), context, 0)?;
                &local
            }
            None => ctx,
        };

        let mut node = Node::default();
        for (key, value) in obj {
            if key == "@context" {
                continue;
            }
            let expanded = ctx.expand(key, true);
            match expanded.as_str() {
                "@id" => node.id = value.as_str().map(|id| ctx.expand(id, false)),
                "@type" => {
                    let types = value.as_array().map(Vec::as_slice).unwrap_or(std::slice::from_ref(value));
                    node.types.extend(
                        types
                            .iter()
                            .filter_map(JsonValue::as_str)
                            .map(|t| ctx.expand(t, true)),
                    );
                }
                k if k.starts_with('@') => {}
                _ => {
                    let values = self.values(ctx, ctx.term(key), value)?;
                    if values.is_empty() {
                        continue;
                    }
                    match node.properties.iter_mut().find(|(name, _)| *name == expanded) {
                        Some((_, existing)) => existing.extend(values),
                        None => node.properties.push((expanded, values)),
                    }
                }
            }
        }
        Ok(node)
    }

    fn values(
        &mut self,
        ctx: &ActiveContext,
        term: Option<&TermDefinition>,
        value: &JsonValue,
    ) -> Result<Vec<NodeValue>> {
        let mut out = Vec::new();
        self.collect_values(ctx, term, value, &mut out)?;
        Ok(out)
    }

    fn collect_values(
        &mut self,
        ctx: &ActiveContext,
        term: Option<&TermDefinition>,
        value: &JsonValue,
        out: &mut Vec<NodeValue>,
    ) -> Result<()> {
        match value {
            JsonValue::Null => {}
            JsonValue::Array(members) => {
                for member in members {
                    self.collect_values(ctx, term, member, out)?;
                }
            }
            JsonValue::String(s) if term.is_some_and(|t| t.type_id) => {
                out.push(NodeValue::Node(Node {
                    id: Some(ctx.expand(s, false)),
                    ..Default::default()
                }));
            }
            JsonValue::String(s) => {
                let language = match term.and_then(|t| t.language.clone()) {
                    Some(language) => language,
                    None => ctx.language.clone(),
                };
                out.push(NodeValue::Literal {
                    value: s.clone(),
                    language,
                    datatype: None,
                });
            }
            JsonValue::Number(_) | JsonValue::Bool(_) => out.push(NodeValue::Literal {
                value: value.to_string(),
                language: None,
                datatype: None,
            }),
            JsonValue::Object(obj) => {
                let keyword = |name: &str| {
                    obj.iter()
                        .find(|(k, _)| ctx.expand(k, true) == name)
                        .map(|(_, v)| v)
                };

                if let Some(literal) = keyword("@value") {
                    let value = match literal {
                        JsonValue::String(s) => s.clone(),
                        JsonValue::Null => return Ok(()),
                        other => other.to_string(),
                    };
                    out.push(NodeValue::Literal {
                        value,
                        language: keyword("@language").and_then(JsonValue::as_str).map(String::from),
                        datatype: keyword("@type")
                            .and_then(JsonValue::as_str)
                            .map(|t| ctx.expand(t, true)),
                    });
                } else if let Some(members) = keyword("@list").or_else(|| keyword("@set")) {
                    self.collect_values(ctx, term, members, out)?;
                } else {
                    let mut node = self.node(ctx, obj)?;
                    if node.id.is_none() {
                        node.id = Some(self.blank_node());
                    }
                    out.push(NodeValue::Node(node));
                }
            }
        }
        Ok(())
    }

    fn blank_node(&mut self) -> String {
        let label = format!("_:b{}", self.blank_nodes);
        self.blank_nodes += 1;
        label
    }
}

fn define_terms(ctx: &mut ActiveContext, table: &Map<String, JsonValue>) {
    for (key, definition) in table {
        match key.as_str() {
            "@vocab" => ctx.vocab = definition.as_str().map(String::from),
            "@base" => ctx.base = definition.as_str().map(String::from),
            "@language" => ctx.language = definition.as_str().map(String::from),
            k if k.starts_with('@') => {}
            _ => {
                let term = match definition {
                    JsonValue::Null => {
                        ctx.terms.remove(key);
                        continue;
                    }
                    JsonValue::String(id) => TermDefinition {
                        id: Some(id.clone()),
                        ..Default::default()
                    },
                    JsonValue::Object(obj) => TermDefinition {
                        id: obj.get("@id").and_then(JsonValue::as_str).map(String::from),
                        type_id: matches!(
                            obj.get("@type").and_then(JsonValue::as_str),
                            Some("@id") | Some("@vocab")
                        ),
                        language: obj
                            .get("@language")
                            .map(|l| l.as_str().map(String::from)),
                    },
                    _ => continue,
                };
                ctx.terms.insert(key.clone(), term);
            }
        }
    }
}
