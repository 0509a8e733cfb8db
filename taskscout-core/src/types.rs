//! Core domain types for taskscout
//!
//! These types form the vocabulary shared by every discovery plugin and by
//! the normalization layer.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Artifact** | A raw, pre-normalization discovery of a potential command, tied to a source file |
//! | **Origin** | The source format a command was discovered in (Taskfile, package.json, ...) |
//! | **Confidence** | Heuristic quality score in `[0, 1]` attached by the producing plugin |
//! | **Invocation** | Adapter-specific data describing how to run a normalized command |
//! | **Scope tag** | `scope:<relative dir>` label for commands found below the project root |
//!
//! ## Lifecycle
//!
//! ```text
//! RawArtifact (scan) ──► RawArtifact (classify/extract) ──► CommandDefinition (normalize)
//! ```
//!
//! Artifacts are never persisted. [`CommandDefinition`] is the stable output
//! unit and serializes losslessly to the catalog JSON format.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

// ============================================
// Origin
// ============================================

/// Source format a command was discovered in.
///
/// Used both for filtering and for picking an invocation adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// `Taskfile.yml` task runner definitions
    Taskfile,
    /// `package.json` scripts
    PackageScript,
    Python,
    Powershell,
    Shell,
    Docker,
    /// Agent/workflow graph definitions
    WorkflowGraph,
    /// Project scaffolding templates
    Template,
    /// Anything not covered above
    Other,
}

impl Origin {
    /// All origins, in declaration order.
    pub const ALL: [Origin; 9] = [
        Origin::Taskfile,
        Origin::PackageScript,
        Origin::Python,
        Origin::Powershell,
        Origin::Shell,
        Origin::Docker,
        Origin::WorkflowGraph,
        Origin::Template,
        Origin::Other,
    ];

    /// Returns the tag used in metadata and serialized output
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Taskfile => "taskfile",
            Origin::PackageScript => "package_script",
            Origin::Python => "python",
            Origin::Powershell => "powershell",
            Origin::Shell => "shell",
            Origin::Docker => "docker",
            Origin::WorkflowGraph => "workflow_graph",
            Origin::Template => "template",
            Origin::Other => "other",
        }
    }

    /// Resolve an optional metadata tag, falling back to [`Origin::Other`]
    /// for missing or unknown values.
    pub fn resolve(tag: Option<&str>) -> Self {
        tag.and_then(|t| t.parse().ok()).unwrap_or(Origin::Other)
    }
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Origin {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Origin::ALL
            .into_iter()
            .find(|o| o.as_str() == s)
            .ok_or_else(|| format!("unknown origin: {}", s))
    }
}

// ============================================
// Parameters
// ============================================

/// Normalized type of an invocation-time parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterType {
    String,
    Integer,
    Float,
    Boolean,
    Enum,
    Path,
}

impl ParameterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterType::String => "string",
            ParameterType::Integer => "integer",
            ParameterType::Float => "float",
            ParameterType::Boolean => "boolean",
            ParameterType::Enum => "enum",
            ParameterType::Path => "path",
        }
    }

    /// Whether `min`/`max` bounds apply to this type
    pub fn is_numeric(&self) -> bool {
        matches!(self, ParameterType::Integer | ParameterType::Float)
    }
}

impl std::fmt::Display for ParameterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One invocation-time parameter of a command.
///
/// Always constructed through [`ParameterDefinition::builder`] (or
/// deserialization, which goes through the same checks), so every value
/// in circulation satisfies:
///
/// - `enum` is non-empty and only present for [`ParameterType::Enum`]
/// - `min`/`max` are only present for numeric types, and `min <= max`
/// - `regex` is only present for [`ParameterType::String`] and compiles
/// - a required parameter carries no default
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ParameterBuilder")]
pub struct ParameterDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ParameterType,
    pub description: Option<String>,
    pub required: bool,
    pub default: Option<Value>,
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<String>>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub regex: Option<String>,
    pub examples: Option<Vec<String>>,
    /// Extensible metadata (e.g. `{"positional": true}`)
    pub meta: BTreeMap<String, Value>,
}

impl ParameterDefinition {
    /// Start building a parameter of the given name and type.
    pub fn builder(name: impl Into<String>, param_type: ParameterType) -> ParameterBuilder {
        ParameterBuilder {
            name: name.into(),
            param_type,
            description: None,
            required: false,
            default: None,
            enum_values: None,
            min: None,
            max: None,
            regex: None,
            examples: None,
            meta: BTreeMap::new(),
        }
    }

    /// True when the parameter is passed positionally rather than as a flag.
    pub fn is_positional(&self) -> bool {
        self.meta
            .get("positional")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

/// Unvalidated parameter fields.
///
/// [`ParameterBuilder::build`] enforces the [`ParameterDefinition`]
/// invariants.
#[derive(Debug, Clone, Deserialize)]
pub struct ParameterBuilder {
    name: String,
    #[serde(rename = "type")]
    param_type: ParameterType,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    default: Option<Value>,
    #[serde(default, rename = "enum")]
    enum_values: Option<Vec<String>>,
    #[serde(default)]
    min: Option<f64>,
    #[serde(default)]
    max: Option<f64>,
    #[serde(default)]
    regex: Option<String>,
    #[serde(default)]
    examples: Option<Vec<String>>,
    #[serde(default)]
    meta: BTreeMap<String, Value>,
}

impl ParameterBuilder {
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn enum_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn regex(mut self, pattern: impl Into<String>) -> Self {
        self.regex = Some(pattern.into());
        self
    }

    pub fn examples<I, S>(mut self, examples: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.examples = Some(examples.into_iter().map(Into::into).collect());
        self
    }

    pub fn meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Validate and produce the parameter.
    pub fn build(self) -> Result<ParameterDefinition> {
        let name = self.name.as_str();

        if name.trim().is_empty() {
            return Err(Error::invalid_parameter(name, "name must not be empty"));
        }

        if let Some(values) = &self.enum_values {
            if self.param_type != ParameterType::Enum {
                return Err(Error::invalid_parameter(
                    name,
                    format!("'enum' provided but type is '{}'", self.param_type),
                ));
            }
            if values.is_empty() {
                return Err(Error::invalid_parameter(name, "'enum' list cannot be empty"));
            }
        }

        if (self.min.is_some() || self.max.is_some()) && !self.param_type.is_numeric() {
            return Err(Error::invalid_parameter(
                name,
                format!("'min'/'max' only valid for numeric types, not '{}'", self.param_type),
            ));
        }
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(Error::invalid_parameter(
                    name,
                    format!("'min' ({}) is greater than 'max' ({})", min, max),
                ));
            }
        }

        if let Some(pattern) = &self.regex {
            if self.param_type != ParameterType::String {
                return Err(Error::invalid_parameter(
                    name,
                    format!("'regex' only valid for type 'string', not '{}'", self.param_type),
                ));
            }
            regex::Regex::new(pattern).map_err(|e| {
                Error::invalid_parameter(name, format!("invalid regex pattern: {}", e))
            })?;
        }

        let has_default = matches!(&self.default, Some(v) if !v.is_null());
        if self.required && has_default {
            return Err(Error::invalid_parameter(
                name,
                "required parameters must not define a default value",
            ));
        }

        Ok(ParameterDefinition {
            name: self.name,
            param_type: self.param_type,
            description: self.description,
            required: self.required,
            default: self.default.filter(|v| !v.is_null()),
            enum_values: self.enum_values,
            min: self.min,
            max: self.max,
            regex: self.regex,
            examples: self.examples,
            meta: self.meta,
        })
    }
}

impl TryFrom<ParameterBuilder> for ParameterDefinition {
    type Error = Error;

    fn try_from(builder: ParameterBuilder) -> Result<Self> {
        builder.build()
    }
}

// ============================================
// Raw artifacts
// ============================================

/// Scanner-specific fields carried by a [`RawArtifact`].
///
/// Plugins write into this, normalization reads from it. Known keys are
/// typed fields; anything else a plugin wants to pass along goes into
/// `extra` and is preserved verbatim under the command's `raw_meta`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMeta {
    /// Declared task name (task-runner files)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_name: Option<String>,
    /// Declared script name (package manifests)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Origin tag; kept as a string so unknown values can degrade to `other`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    /// Raw command string used for parameter inference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_cmd: Option<String>,
    /// Directory the command must run in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Detected package manager (`npm`, `pnpm`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_manager: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ArtifactMeta {
    /// Declared command name, preferring the task name over the script name.
    pub fn declared_name(&self) -> Option<&str> {
        self.task_name
            .as_deref()
            .or(self.script_name.as_deref())
            .filter(|n| !n.is_empty())
    }
}

/// Intermediate discovery output before normalization.
///
/// Created by a plugin's scan phase; classify/extract phases replace it
/// with a new value rather than mutating it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawArtifact {
    /// Free-form artifact kind (e.g. "task", "package_script")
    #[serde(rename = "type")]
    pub kind: String,
    /// File the artifact was found in
    pub path: String,
    /// Raw command or body text
    pub content_snippet: Option<String>,
    pub meta: ArtifactMeta,
    /// Producing plugin's confidence; `None` means unknown
    pub confidence: Option<f64>,
}

impl RawArtifact {
    /// Create an artifact with empty metadata and unknown confidence.
    pub fn new(kind: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            path: path.into(),
            content_snippet: None,
            meta: ArtifactMeta::default(),
            confidence: None,
        }
    }
}

// ============================================
// Commands
// ============================================

/// Adapter name for Taskfile tasks.
pub const ADAPTER_TASKFILE: &str = "taskfile";
/// Adapter name for package.json scripts (any Node package manager).
pub const ADAPTER_NPM: &str = "npm";

/// How to execute a normalized command.
///
/// Serializes as a flat object; an invocation with no adapter serializes as
/// `{}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Invocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adapter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_manager: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
    /// Fields for adapters without a typed slot
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Invocation {
    pub fn is_empty(&self) -> bool {
        *self == Invocation::default()
    }

    /// Render the shell command this invocation stands for.
    ///
    /// Returns `None` for adapters that have no command-line form.
    pub fn command_line(&self) -> Option<String> {
        match self.adapter.as_deref()? {
            ADAPTER_TASKFILE => Some(format!("task {}", self.task_name.as_deref()?)),
            ADAPTER_NPM => Some(format!(
                "{} run {}",
                self.package_manager.as_deref().unwrap_or("npm"),
                self.script_name.as_deref()?
            )),
            _ => None,
        }
    }
}

/// Enrichment data attached to a [`CommandDefinition`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandMeta {
    /// Metadata of the artifact this command was normalized from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_meta: Option<ArtifactMeta>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Return a truncated SHA-256 hex digest of the identifying parts.
///
/// Parts are joined with the ASCII unit separator so that a name containing
/// path fragments cannot collide with a different path/name split. 16 hex
/// characters (~64 bits) is enough for uniqueness within one project.
pub fn stable_command_id<S: AsRef<str>>(parts: &[S]) -> String {
    let joined = parts
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("\x1f");
    let digest = Sha256::digest(joined.as_bytes());
    hex::encode(&digest[..8])
}

/// Normalized command produced by the discovery pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandDefinition {
    /// Stable id derived from `(origin, source_path, name)`
    pub id: String,
    pub name: String,
    pub source_path: String,
    pub origin: Origin,
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: Vec<ParameterDefinition>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub estimated_runtime_seconds: Option<f64>,
    #[serde(default)]
    pub invocation: Invocation,
    #[serde(default)]
    pub meta: CommandMeta,
}

impl CommandDefinition {
    /// Create a command with its stable id and otherwise empty fields.
    ///
    /// Use struct update syntax to fill in the rest:
    ///
    /// ```
    /// use taskscout_core::types::{CommandDefinition, Origin};
    ///
    /// let cmd = CommandDefinition {
    ///     description: Some("Build the project".to_string()),
    ///     ..CommandDefinition::new(Origin::Taskfile, "Taskfile.yml", "build")
    /// };
    /// assert_eq!(cmd.id.len(), 16);
    /// ```
    pub fn new(origin: Origin, source_path: impl Into<String>, name: impl Into<String>) -> Self {
        let source_path = source_path.into();
        let name = name.into();
        Self {
            id: stable_command_id(&[origin.as_str(), source_path.as_str(), name.as_str()]),
            name,
            source_path,
            origin,
            description: None,
            parameters: Vec::new(),
            tags: Vec::new(),
            estimated_runtime_seconds: None,
            invocation: Invocation::default(),
            meta: CommandMeta::default(),
        }
    }

    /// Look up a parameter by name.
    pub fn parameter(&self, name: &str) -> Option<&ParameterDefinition> {
        self.parameters.iter().find(|p| p.name == name)
    }
}
