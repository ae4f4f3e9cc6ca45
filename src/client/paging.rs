//! Search paging state machine, RFC 2696, `spec.md` §4.5.7.

use tokio::sync::mpsc;

use crate::control::{Control, PagedResultsValue, PAGED_RESULTS_OID};
use crate::error::{LdapError, Result};
use crate::message::{DerefAliases, LdapResult, ProtocolOp, SearchResultEntry, SearchResultReference};
use crate::message::SearchRequest;

use super::Client;

/// Caller-tunable behavior for `Client::search`/`Client::streaming_search`.
/// `spec.md` §4.5 SearchRequest field list.
#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
    pub paged: bool,
    pub page_size: Option<u32>,
    pub deref_aliases: DerefAliases,
    /// 0 means no client-requested cap.
    pub size_limit: u32,
    /// 0 means no client-requested cap, in seconds.
    pub time_limit: u32,
    pub types_only: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            paged: false,
            page_size: None,
            deref_aliases: DerefAliases::Never,
            size_limit: 0,
            time_limit: 0,
            types_only: false,
        }
    }
}

/// The accumulated result of a (possibly multi-page) search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub entries: Vec<SearchResultEntry>,
    pub references: Vec<SearchResultReference>,
    pub result: LdapResult,
}

fn page_size(options: SearchOptions, request: &SearchRequest, default_page_size: u32) -> u32 {
    if let Some(size) = options.page_size {
        return size;
    }
    if request.size_limit > 1 {
        return request.size_limit - 1;
    }
    default_page_size
}

/// Runs `request` to completion, transparently paging with the
/// Paged-Results control when `options.paged` is set. A caller-supplied
/// Paged-Results control is rejected up front — the core owns the paging
/// loop (`spec.md` §4.5.7).
pub(crate) async fn run_search(
    client: &Client,
    request: SearchRequest,
    controls: Vec<Control>,
    options: SearchOptions,
    default_page_size: u32,
) -> Result<SearchOutcome> {
    let mut entries = Vec::new();
    let mut references = Vec::new();
    let result = run_pages(client, request, controls, options, default_page_size, |page| {
        entries.extend(page.0);
        references.extend(page.1);
    })
    .await?;
    Ok(SearchOutcome { entries, references, result })
}

/// Like `run_search`, but hands each page's entries to `client`'s caller as
/// soon as that page completes, instead of buffering every page until the
/// whole (possibly multi-page) search is done. `spec.md` §11.
pub(crate) async fn run_search_streaming(
    client: &Client,
    request: SearchRequest,
    controls: Vec<Control>,
    options: SearchOptions,
    default_page_size: u32,
    tx: mpsc::UnboundedSender<SearchResultEntry>,
) -> Result<LdapResult> {
    run_pages(client, request, controls, options, default_page_size, |page| {
        for entry in page.0 {
            if tx.send(entry).is_err() {
                break;
            }
        }
    })
    .await
}

/// Drives the RFC 2696 paging loop (or a single request when paging is
/// off), calling `on_page` with each page's `(entries, references)` as it
/// arrives. Returns the final `SearchResultDone`'s `LdapResult`.
async fn run_pages(
    client: &Client,
    request: SearchRequest,
    controls: Vec<Control>,
    options: SearchOptions,
    default_page_size: u32,
    mut on_page: impl FnMut((Vec<SearchResultEntry>, Vec<SearchResultReference>)),
) -> Result<LdapResult> {
    if controls.iter().any(|c| c.oid == PAGED_RESULTS_OID) {
        return Err(LdapError::InvalidInput(
            "caller-supplied Paged-Results control is not allowed; use SearchOptions::paged".into(),
        ));
    }

    if !options.paged {
        let outcome = client
            .send(ProtocolOp::SearchRequest(request), controls)
            .await?;
        let result = match outcome.message.op {
            ProtocolOp::SearchResultDone(result) => result,
            _ => {
                return Err(LdapError::Codec(crate::error::CodecError::UnexpectedStructure(
                    "expected SearchResultDone".into(),
                )))
            }
        };
        on_page((outcome.search_entries, outcome.search_references));
        return Ok(result);
    }

    let mut paged = PagedResultsValue::request(page_size(options, &request, default_page_size));

    loop {
        let mut page_controls = controls.clone();
        page_controls.push(paged.clone().into_control(true));

        let outcome = client
            .send(ProtocolOp::SearchRequest(request.clone()), page_controls)
            .await?;

        let result = match outcome.message.op {
            ProtocolOp::SearchResultDone(result) => result,
            _ => {
                return Err(LdapError::Codec(crate::error::CodecError::UnexpectedStructure(
                    "expected SearchResultDone".into(),
                )))
            }
        };

        let response_control = outcome
            .message
            .controls
            .iter()
            .find(|c| c.oid == PAGED_RESULTS_OID)
            .cloned();

        on_page((outcome.search_entries, outcome.search_references));

        let Some(response_control) = response_control else {
            return Ok(result);
        };
        let Some(value) = response_control.value else {
            return Ok(result);
        };
        let next = PagedResultsValue::decode(&value)?;
        if next.is_final_page() {
            return Ok(result);
        }
        paged = PagedResultsValue {
            size: paged.size,
            cookie: next.cookie,
        };
    }
}
