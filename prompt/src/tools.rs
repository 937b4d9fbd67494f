//! Tool-list assembly (spec §4.4, §4.9 "tool-list caching").
//!
//! The tool definitions are never actually invoked as function calls —
//! they exist to pin down the operation shapes the system prompt
//! describes in structured form, the same way the reference provider
//! adapter forwards `ToolDefinition`s. Order and content must be stable
//! per tier across turns since the provider's prompt cache is keyed on
//! the full prefix, tools included.

use aide_classify::Tier;
use aide_llm::{CacheControl, ToolSchema};
use serde_json::json;

fn object_schema(properties: serde_json::Value, required: &[&str]) -> serde_json::Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn voice_tool() -> (&'static str, &'static str, serde_json::Value) {
    (
        "voice",
        "Send a line of chat text to the user.",
        object_schema(json!({ "text": { "type": "string" } }), &["text"]),
    )
}

fn mutation_tools() -> Vec<(&'static str, &'static str, serde_json::Value)> {
    vec![
        (
            "meta_set",
            "Merge fields into the page's top-level metadata.",
            object_schema(json!({ "p": { "type": "object" } }), &["p"]),
        ),
        (
            "entity_create",
            "Create a new entity under an existing parent.",
            object_schema(
                json!({
                    "id": { "type": "string" },
                    "parent": { "type": "string" },
                    "display": { "type": "string" },
                    "p": { "type": "object" },
                }),
                &["id", "parent"],
            ),
        ),
        (
            "entity_update",
            "Merge fields into an existing entity's props.",
            object_schema(
                json!({ "ref": { "type": "string" }, "p": { "type": "object" } }),
                &["ref", "p"],
            ),
        ),
        (
            "entity_remove",
            "Soft-delete an entity and its living descendants.",
            object_schema(json!({ "ref": { "type": "string" } }), &["ref"]),
        ),
        (
            "entity_move",
            "Reparent an entity, optionally at a specific sibling position.",
            object_schema(
                json!({
                    "ref": { "type": "string" },
                    "parent": { "type": "string" },
                    "position": { "type": "integer" },
                }),
                &["ref", "parent"],
            ),
        ),
        (
            "entity_reorder",
            "Replace the sibling order of a parent's living children.",
            object_schema(
                json!({
                    "ref": { "type": "string" },
                    "children": { "type": "array", "items": { "type": "string" } },
                }),
                &["ref", "children"],
            ),
        ),
        (
            "rel_set",
            "Create or replace a typed relationship edge.",
            object_schema(
                json!({
                    "from": { "type": "string" },
                    "to": { "type": "string" },
                    "type": { "type": "string" },
                    "cardinality": { "type": "string" },
                    "data": { "type": "object" },
                }),
                &["from", "to", "type"],
            ),
        ),
        (
            "rel_remove",
            "Drop a specific relationship edge.",
            object_schema(
                json!({
                    "from": { "type": "string" },
                    "to": { "type": "string" },
                    "type": { "type": "string" },
                }),
                &["from", "to", "type"],
            ),
        ),
        (
            "style_set",
            "Best-effort merge into page-level style.",
            object_schema(json!({ "p": { "type": "object" } }), &["p"]),
        ),
        (
            "style_entity",
            "Best-effort merge into one entity's style props.",
            object_schema(
                json!({ "ref": { "type": "string" }, "p": { "type": "object" } }),
                &["ref", "p"],
            ),
        ),
        (
            "meta_annotate",
            "Best-effort merge into page-level annotations.",
            object_schema(json!({ "p": { "type": "object" } }), &["p"]),
        ),
    ]
}

/// Build the ordered, cache-marked tool list for one tier (spec §4.4:
/// "a fixed ordered list of tool definitions ... The analyst tier
/// receives a restricted tool list (voice-only); the two mutation tiers
/// share the same list"). The cache marker lands on the last entry.
pub fn build_tool_schemas(tier: Tier) -> Vec<ToolSchema> {
    let mut defs = match tier {
        Tier::Analyst => Vec::new(),
        Tier::Fast | Tier::Structural => mutation_tools(),
    };
    defs.push(voice_tool());

    let last = defs.len().saturating_sub(1);
    defs.into_iter()
        .enumerate()
        .map(|(i, (name, description, input_schema))| ToolSchema {
            name: name.to_string(),
            description: description.to_string(),
            input_schema,
            cache_control: if i == last { Some(CacheControl::ephemeral()) } else { None },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyst_tier_is_voice_only() {
        let tools = build_tool_schemas(Tier::Analyst);
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "voice");
    }

    #[test]
    fn fast_and_structural_share_the_same_list() {
        let fast = build_tool_schemas(Tier::Fast);
        let structural = build_tool_schemas(Tier::Structural);
        let fast_names: Vec<&str> = fast.iter().map(|t| t.name.as_str()).collect();
        let structural_names: Vec<&str> = structural.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(fast_names, structural_names);
        assert!(fast_names.contains(&"voice"));
        assert!(fast_names.contains(&"entity_create"));
    }

    #[test]
    fn only_the_last_tool_is_cache_marked() {
        let tools = build_tool_schemas(Tier::Fast);
        for (i, tool) in tools.iter().enumerate() {
            if i + 1 == tools.len() {
                assert!(tool.cache_control.is_some());
            } else {
                assert!(tool.cache_control.is_none());
            }
        }
    }
}
