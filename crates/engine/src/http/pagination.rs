//! The `paginate_request` paginator (§4.5): one function shared by all four
//! strategies, driven by a small accumulator.

use nebula_execution::resolve_path;
use nebula_resilience::{ResilienceConfig, call_with_resilience, now_ms};
use serde_json::{Map, Value, json};

use super::executor::{HttpExecutor, HttpRequestSpec};
use crate::error::EngineError;

/// Which stop condition and query-parameter convention governs page
/// advancement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationStrategy {
    NextUrl,
    CursorParam,
    OffsetLimit,
    PageNumber,
}

impl PaginationStrategy {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "next_url" => Some(Self::NextUrl),
            "cursor_param" => Some(Self::CursorParam),
            "offset_limit" => Some(Self::OffsetLimit),
            "page_number" => Some(Self::PageNumber),
            _ => None,
        }
    }
}

/// Tunables read from `paginate_request` config.
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    pub strategy: PaginationStrategy,
    pub items_path: String,
    pub max_pages: u32,
    pub page_size: u64,
    pub next_cursor_path: String,
    pub has_more_path: String,
    pub cursor_param: String,
    pub page_param: String,
    pub offset_param: String,
    pub limit_param: String,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            strategy: PaginationStrategy::PageNumber,
            items_path: "body.data".to_string(),
            max_pages: 25,
            page_size: 25,
            next_cursor_path: "body.next_cursor".to_string(),
            has_more_path: "body.has_more".to_string(),
            cursor_param: "cursor".to_string(),
            page_param: "page".to_string(),
            offset_param: "offset".to_string(),
            limit_param: "limit".to_string(),
        }
    }
}

/// The paginator's aggregate output plus the last page's full response
/// record, so the caller can set `system.last_response` to the latter
/// (§4.5: "`last_response` … set to … the last page on a paginator").
#[derive(Debug, Clone)]
pub struct PaginationOutcome {
    pub output: Value,
    pub last_page: Option<Value>,
}

/// Drives `base_request` through successive pages, accumulating `items`
/// extracted at `config.items_path` from each page's body.
pub async fn run(
    executor: &HttpExecutor,
    breakers: &mut Map<String, Value>,
    node_id: &str,
    mut base_request: HttpRequestSpec,
    resilience: &ResilienceConfig,
    config: &PaginationConfig,
) -> Result<PaginationOutcome, EngineError> {
    let max_pages = config.max_pages.max(1);

    let mut items = Vec::new();
    let mut pages = Vec::new();
    let mut pages_fetched = 0u32;
    let mut last_page = None;

    let mut offset: u64 = 0;
    let mut page_number: u64 = 1;

    loop {
        let spec = base_request.clone();
        let response = call_with_resilience(breakers, node_id, resilience, now_ms, |_attempt| {
            executor.send(&spec)
        })
        .await
        .map_err(|err| super::resilience_err_to_engine_err(node_id, err))?;

        pages_fetched += 1;
        let page_root = json!({"body": response.body});
        let page_items = resolve_path(&page_root, &config.items_path);
        let page_item_count = page_items.as_array().map_or(0, Vec::len);
        if let Value::Array(arr) = page_items {
            items.extend(arr);
        }
        let page_record = response.to_json();
        pages.push(page_record.clone());
        last_page = Some(page_record);

        if pages_fetched >= max_pages {
            break;
        }

        let should_continue = match config.strategy {
            PaginationStrategy::NextUrl => {
                let next = resolve_path(&page_root, &config.next_cursor_path);
                match next.as_str() {
                    Some(next_url) if !next_url.is_empty() => {
                        base_request.url = next_url.to_string();
                        base_request.extra_query.clear();
                        true
                    }
                    _ => false,
                }
            }
            PaginationStrategy::CursorParam => {
                let next = resolve_path(&page_root, &config.next_cursor_path);
                let stop = match &next {
                    Value::Null => true,
                    Value::Bool(b) => !*b,
                    Value::String(s) => s.is_empty(),
                    _ => false,
                };
                if stop {
                    false
                } else {
                    let cursor = next.as_str().map_or_else(|| next.to_string(), str::to_string);
                    set_query_param(&mut base_request, &config.cursor_param, cursor);
                    true
                }
            }
            PaginationStrategy::OffsetLimit => {
                if (page_item_count as u64) < config.page_size {
                    false
                } else {
                    offset += config.page_size;
                    set_query_param(&mut base_request, &config.offset_param, offset.to_string());
                    set_query_param(
                        &mut base_request,
                        &config.limit_param,
                        config.page_size.to_string(),
                    );
                    true
                }
            }
            PaginationStrategy::PageNumber => {
                let has_more = resolve_path(&page_root, &config.has_more_path);
                if matches!(has_more, Value::Bool(false)) || has_more.is_null() {
                    false
                } else {
                    page_number += 1;
                    set_query_param(&mut base_request, &config.page_param, page_number.to_string());
                    true
                }
            }
        };

        if !should_continue {
            break;
        }
    }

    let status_code = if pages.is_empty() { 204 } else { 200 };
    Ok(PaginationOutcome {
        output: json!({
            "status_code": status_code,
            "pages_fetched": pages_fetched,
            "items": items,
            "pages": pages,
        }),
        last_page,
    })
}

fn set_query_param(request: &mut HttpRequestSpec, name: &str, value: String) {
    if let Some(entry) = request.extra_query.iter_mut().find(|(k, _)| k == name) {
        entry.1 = value;
    } else {
        request.extra_query.push((name.to_string(), value));
    }
}
