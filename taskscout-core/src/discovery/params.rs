//! Heuristic parameter inference from raw command strings.
//!
//! The command is split on whitespace and each token is classified:
//!
//! | Token | Parameter |
//! |-------|-----------|
//! | `--key=value` | optional `string`, default `value` |
//! | `--flag` | optional `boolean`, default `false` |
//! | `<name>` | required positional `string` |
//! | anything else | ignored |
//!
//! Hyphens in derived names become underscores. The first token producing a
//! given name wins; later duplicates are dropped.

use crate::types::{ParameterBuilder, ParameterDefinition, ParameterType};
use std::collections::HashSet;

/// Infer parameters from a raw command string.
///
/// `None` or an empty string yields no parameters.
pub fn infer_parameters(raw_cmd: Option<&str>) -> Vec<ParameterDefinition> {
    let Some(raw_cmd) = raw_cmd else {
        return Vec::new();
    };

    let mut params = Vec::new();
    let mut seen = HashSet::new();

    for token in raw_cmd.split_whitespace() {
        let Some((name, builder)) = classify_token(token) else {
            continue;
        };
        if name.is_empty() || seen.contains(&name) {
            continue;
        }

        match builder.build() {
            Ok(param) => {
                seen.insert(name);
                params.push(param);
            }
            Err(e) => {
                tracing::warn!(token, error = %e, "Skipping uninferable parameter");
            }
        }
    }

    params
}

/// Map a token to its parameter name and an unbuilt definition.
fn classify_token(token: &str) -> Option<(String, ParameterBuilder)> {
    if let Some(body) = token.strip_prefix("--") {
        if let Some((key, value)) = body.split_once('=') {
            let name = param_name(key);
            let builder = ParameterDefinition::builder(name.clone(), ParameterType::String)
                .description(format!("Flag --{} value", flag_name(&name)))
                .default_value(value);
            return Some((name, builder));
        }

        let name = param_name(body);
        let builder = ParameterDefinition::builder(name.clone(), ParameterType::Boolean)
            .description(format!("Toggle --{}", flag_name(&name)))
            .default_value(false);
        return Some((name, builder));
    }

    if token.len() > 2 && token.starts_with('<') && token.ends_with('>') {
        let name = param_name(&token[1..token.len() - 1]);
        let builder = ParameterDefinition::builder(name.clone(), ParameterType::String)
            .description(format!("Positional parameter {}", token))
            .required(true)
            .meta("positional", true);
        return Some((name, builder));
    }

    None
}

fn param_name(raw: &str) -> String {
    raw.trim().replace('-', "_")
}

fn flag_name(name: &str) -> String {
    name.replace('_', "-")
}
