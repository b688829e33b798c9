//! Stage operator registry
//!
//! The registry is closed: every supported stage operator is a variant of
//! [`StageOperator`] and generation is an exhaustive match over the variant's
//! [`StageKind`].
//!
//! | token        | kind         | stage value                                  |
//! |--------------|--------------|----------------------------------------------|
//! | `$skip`      | PassThrough  | bound parameter, verbatim                    |
//! | `$limit`     | PassThrough  | bound parameter, verbatim                    |
//! | `$project`   | StaticEcho   | static arguments, verbatim                   |
//! | `$group`     | StaticEcho   | static arguments, verbatim                   |
//! | `$sort`      | OrderedSort  | `order: [{field, verse}]` → `{field: ±1}`    |
//! | `$match`     | Filter       | compiled filter from the bound parameter     |
//! | `$unionWith` | Union        | `{coll, pipeline}` of the named aggregation  |

use std::fmt;

use bson::{Bson, Document};

use crate::error::{CompileError, CompileResult};
use crate::filter::build_filter;

use super::params::{Param, Params};
use super::CompiledPipeline;

/// Static argument naming the ordered sort list
pub const SORT_ORDER_ARG: &str = "order";
/// Static argument naming the aggregation a union stage embeds
pub const UNION_PIPELINE_ARG: &str = "pipeline";

/// Generation strategy shared by several operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    PassThrough,
    StaticEcho,
    OrderedSort,
    Filter,
    Union,
}

/// Supported stage operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageOperator {
    Skip,
    Limit,
    Project,
    Group,
    Sort,
    Match,
    UnionWith,
}

/// Re-entry point used by union stages to compile the aggregation they embed
pub trait NestedCompiler {
    /// Compiles the named aggregation, returning its target collection and
    /// pipeline
    fn compile_nested(
        &mut self,
        name: &str,
        params: &Params,
    ) -> CompileResult<(String, CompiledPipeline)>;
}

impl StageOperator {
    pub const ALL: [StageOperator; 7] = [
        StageOperator::Skip,
        StageOperator::Limit,
        StageOperator::Project,
        StageOperator::Group,
        StageOperator::Sort,
        StageOperator::Match,
        StageOperator::UnionWith,
    ];

    /// Resolves an operator token, `None` if unregistered
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.token() == token)
    }

    pub fn token(&self) -> &'static str {
        match self {
            StageOperator::Skip => "$skip",
            StageOperator::Limit => "$limit",
            StageOperator::Project => "$project",
            StageOperator::Group => "$group",
            StageOperator::Sort => "$sort",
            StageOperator::Match => "$match",
            StageOperator::UnionWith => "$unionWith",
        }
    }

    pub fn kind(&self) -> StageKind {
        match self {
            StageOperator::Skip | StageOperator::Limit => StageKind::PassThrough,
            StageOperator::Project | StageOperator::Group => StageKind::StaticEcho,
            StageOperator::Sort => StageKind::OrderedSort,
            StageOperator::Match => StageKind::Filter,
            StageOperator::UnionWith => StageKind::Union,
        }
    }

    /// True when compilation fails without a bound parameter
    pub fn requires_param(&self) -> bool {
        matches!(self.kind(), StageKind::PassThrough | StageKind::Filter)
    }

    /// Generates the single-key stage document `{token: value}`
    pub fn generate(
        &self,
        args: &Document,
        param: Option<&Param>,
        nested: &mut dyn NestedCompiler,
    ) -> CompileResult<Document> {
        if param.is_none() && self.requires_param() {
            return Err(CompileError::type_mismatch(format!(
                "{} requires a bound parameter",
                self.token()
            )));
        }

        let value = match self.kind() {
            StageKind::PassThrough => self.pass_through(param)?,
            StageKind::StaticEcho => Bson::Document(args.clone()),
            StageKind::OrderedSort => sort_value(args)?,
            StageKind::Filter => self.match_value(param)?,
            StageKind::Union => union_value(args, param, nested)?,
        };

        let mut stage = Document::new();
        stage.insert(self.token(), value);
        Ok(stage)
    }

    fn pass_through(&self, param: Option<&Param>) -> CompileResult<Bson> {
        param.and_then(Param::to_bson).ok_or_else(|| {
            CompileError::type_mismatch(format!(
                "{} cannot pass through {}",
                self.token(),
                describe(param)
            ))
        })
    }

    fn match_value(&self, param: Option<&Param>) -> CompileResult<Bson> {
        let filter = param.and_then(Param::as_filter).ok_or_else(|| {
            CompileError::type_mismatch(format!(
                "{} requires a filter parameter, got {}",
                self.token(),
                describe(param)
            ))
        })?;
        build_filter(filter).map(Bson::Document)
    }
}

fn describe(param: Option<&Param>) -> String {
    param.map_or_else(|| "nothing".to_string(), |p| format!("a {}", p.kind()))
}

impl fmt::Display for StageOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// Builds the sort document from the ordered `{field, verse}` list.
///
/// Without an `order` list, a non-empty document whose values are all `1` or
/// `-1` is taken as a pre-built native sort document and echoed.
fn sort_value(args: &Document) -> CompileResult<Bson> {
    let entries = match args.get(SORT_ORDER_ARG) {
        Some(Bson::Array(entries)) => entries,
        Some(_) => {
            return Err(CompileError::structural(
                "sort argument 'order' must be a list",
            ))
        }
        None if is_native_sort(args) => return Ok(Bson::Document(args.clone())),
        None => {
            return Err(CompileError::structural(
                "sort stage requires an 'order' argument",
            ))
        }
    };

    if entries.is_empty() {
        return Err(CompileError::structural("sort 'order' list is empty"));
    }

    let mut sort = Document::new();
    for (i, entry) in entries.iter().enumerate() {
        let Bson::Document(entry) = entry else {
            return Err(CompileError::structural(format!(
                "sort entry {} is not a {{field, verse}} structure",
                i
            )));
        };

        let field = match entry.get("field") {
            Some(Bson::String(field)) if !field.is_empty() => field,
            _ => {
                return Err(CompileError::structural(format!(
                    "sort entry {} has no field name",
                    i
                )))
            }
        };

        let direction = match entry.get("verse") {
            None => 1,
            Some(Bson::String(verse)) if verse == "desc" => -1,
            Some(Bson::String(_)) => 1,
            Some(_) => {
                return Err(CompileError::structural(format!(
                    "sort entry {} ('{}') has a non-string verse",
                    i, field
                )))
            }
        };

        sort.insert(field.clone(), Bson::Int32(direction));
    }

    Ok(Bson::Document(sort))
}

fn is_native_sort(args: &Document) -> bool {
    !args.is_empty()
        && args.values().all(|v| match v {
            Bson::Int32(d) => *d == 1 || *d == -1,
            Bson::Int64(d) => *d == 1 || *d == -1,
            Bson::Double(d) => *d == 1.0 || *d == -1.0,
            _ => false,
        })
}

fn union_value(
    args: &Document,
    param: Option<&Param>,
    nested: &mut dyn NestedCompiler,
) -> CompileResult<Bson> {
    let name = match args.get(UNION_PIPELINE_ARG) {
        Some(Bson::String(name)) if !name.is_empty() => name,
        _ => {
            return Err(CompileError::structural(
                "union stage requires a 'pipeline' argument naming an aggregation",
            ))
        }
    };

    let empty = Params::new();
    let params = param.and_then(Param::as_params).unwrap_or(&empty);

    let (collection, pipeline) = nested.compile_nested(name, params)?;

    let mut union = Document::new();
    union.insert("coll", collection);
    union.insert(
        "pipeline",
        pipeline.into_iter().map(Bson::Document).collect::<Vec<_>>(),
    );
    Ok(Bson::Document(union))
}
