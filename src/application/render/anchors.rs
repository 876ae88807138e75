//! Stamps collected anchor ids onto heading elements in rendered HTML.

use std::{cell::RefCell, rc::Rc};

use lol_html::{RewriteStrSettings, element, rewrite_str};

use crate::domain::outline::HeadingRecord;

use super::RenderError;

/// Write each collected heading id to the matching `h1`-`h6` element, in
/// document order. The heading list and the HTML come from the same parse,
/// so a count or level mismatch means the document sprouted heading markup
/// the tree walk never saw (for example raw HTML) and is reported as an
/// error rather than guessed around.
pub(crate) fn apply_heading_ids(
    html: &str,
    headings: &[HeadingRecord],
) -> Result<String, RenderError> {
    let headings_shared = Rc::new(headings.to_vec());
    let index = Rc::new(RefCell::new(0usize));
    let error_slot = Rc::new(RefCell::new(None));

    let rewritten = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("h1, h2, h3, h4, h5, h6", {
                let headings_shared = Rc::clone(&headings_shared);
                let index = Rc::clone(&index);
                let error_slot = Rc::clone(&error_slot);
                move |el| {
                    let mut idx = index.borrow_mut();
                    if *idx >= headings_shared.len() {
                        *error_slot.borrow_mut() = Some(RenderError::Document {
                            message: "unexpected extra heading".to_string(),
                        });
                        return Ok(());
                    }
                    let record = &headings_shared[*idx];
                    *idx += 1;

                    let tag_name = el.tag_name();
                    let level = tag_name
                        .strip_prefix('h')
                        .and_then(|value| value.parse::<u8>().ok())
                        .unwrap_or(0);
                    if level != record.level {
                        *error_slot.borrow_mut() = Some(RenderError::Document {
                            message: format!(
                                "heading level mismatch: expected h{}, found {}",
                                record.level, tag_name
                            ),
                        });
                        return Ok(());
                    }

                    el.set_attribute("id", &record.id)?;
                    Ok(())
                }
            })],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|err| RenderError::Document {
        message: err.to_string(),
    })?;

    if let Some(err) = error_slot.borrow_mut().take() {
        return Err(err);
    }

    Ok(rewritten)
}
