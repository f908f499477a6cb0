// SPDX-License-Identifier: MIT

//! Injects identifying tags into the `aws_*` resource blocks of a layer's
//! HCL files before the provisioner ever sees them, format-preserving so a
//! user's own comments and layout survive.

use hcl::edit::expr::{Expression, FuncArgs, FuncCall, ObjectKey, Traversal};
use hcl::edit::structure::{Attribute, Block, Body};
use hcl::edit::Ident;

use crate::error::AdapterError;

/// Resource block types this tagger recognizes. Only these carry a `tags`
/// attribute in the target ecosystem.
const TAGGED_PREFIX: &str = "aws_";

/// Rewrite `content`, tagging every `resource "aws_*" ...` block with
/// `layerform_layer_name` and `layerform_layer_instance`. Returns the
/// rewritten bytes unchanged if no block in the file qualifies.
pub fn inject_tags(
    path: &str,
    content: &[u8],
    definition_name: &str,
    instance_name: &str,
) -> Result<Vec<u8>, AdapterError> {
    let text = std::str::from_utf8(content)
        .map_err(|e| AdapterError::Hcl { path: path.to_string(), reason: e.to_string() })?;

    let mut body: Body = text
        .parse()
        .map_err(|e: hcl::edit::parser::Error| AdapterError::Hcl { path: path.to_string(), reason: e.to_string() })?;

    let mut modified = false;

    for block in body.blocks_mut() {
        if !is_tagged_resource(block) {
            continue;
        }
        modified = true;
        set_tags(block, definition_name, instance_name);
    }

    if !modified {
        return Ok(content.to_vec());
    }

    Ok(body.to_string().into_bytes())
}

fn is_tagged_resource(block: &Block) -> bool {
    block.ident.as_str() == "resource"
        && block
            .labels
            .first()
            .map(|label| label.as_str().starts_with(TAGGED_PREFIX))
            .unwrap_or(false)
}

fn injected_tags_object(definition_name: &str, instance_name: &str) -> Expression {
    let mut object = hcl::edit::expr::Object::new();
    object.insert(
        ObjectKey::from(Ident::new("layerform_layer_name")),
        Expression::from(definition_name),
    );
    object.insert(
        ObjectKey::from(Ident::new("layerform_layer_instance")),
        Expression::from(instance_name),
    );
    Expression::Object(object)
}

fn set_tags(block: &mut Block, definition_name: &str, instance_name: &str) {
    let injected = injected_tags_object(definition_name, instance_name);

    match block.body.get_attribute_mut("tags") {
        None => {
            block.body.push(Attribute::new(Ident::new("tags"), injected));
        }
        Some(mut existing) => {
            // merge(injected, existing) — the user's own tags win on key
            // collision, matching the original tool's precedence.
            let existing_expr = existing.value.clone();
            let call = FuncCall::new(Ident::new("merge"), FuncArgs::from(vec![injected, existing_expr]));
            *existing.value_mut() = Expression::FuncCall(Box::new(call));
        }
    }
}

/// Build the identity traversal `var.lf_names.<layer>` used when a later
/// pipeline step needs to reference a sibling layer's resolved instance
/// name from within injected HCL (kept here since it shares the `hcl-edit`
/// expression builders with tag injection).
pub fn lf_names_reference(layer: &str) -> Expression {
    Expression::Traversal(Box::new(Traversal::new(
        Expression::Variable(Ident::new("var").into()),
        vec![
            hcl::edit::expr::TraversalOperator::GetAttr(Ident::new("lf_names").into()).into(),
            hcl::edit::expr::TraversalOperator::GetAttr(Ident::new(layer).into()).into(),
        ],
    )))
}

#[cfg(test)]
#[path = "tags_tests.rs"]
mod tests;
