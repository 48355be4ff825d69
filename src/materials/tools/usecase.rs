//! The three entry points offered to the command line: `search`, `export`,
//! and `compare`. Each one converts every failure into an error [`Outcome`].

use std::path::Path;

use tracing::{debug, info, instrument, warn};

use crate::materials::tools::catalogue::{self, PropertyDescriptor};
use crate::materials::tools::error::{Result, ToolError};
use crate::materials::tools::io::console::render_console;
use crate::materials::tools::io::excel_write;
use crate::materials::tools::io::retrieval::{Retriever, SearchFilter};
use crate::materials::tools::matrix::{Layout, build_matrix};
use crate::materials::tools::normalize::normalize;
use crate::materials::tools::outcome::{
    ComparePayload, ExportPayload, Outcome, Payload, SearchPayload,
};
use crate::materials::tools::record::{Record, build_record};

/// Smallest identifier set `compare` accepts.
pub const MIN_COMPARE_IDS: usize = 2;

/// Lists materials matching `filter`. An empty match is a successful search.
pub fn search<R: Retriever>(retriever: &R, filter: &SearchFilter) -> Outcome {
    conclude(run_search(retriever, filter).map(Payload::Search))
}

/// Writes the materials matching `filter` to a workbook at `destination`,
/// creating its directory after the records came back.
///
/// The comparison layout is chosen when `filter` names two or more ids and
/// at least two records come back; otherwise the listing layout is used.
pub fn export<R: Retriever>(retriever: &R, filter: &SearchFilter, destination: &Path) -> Outcome {
    conclude(run_export(retriever, filter, destination).map(Payload::Export))
}

/// Fetches the given materials for side-by-side display. Fewer than
/// [`MIN_COMPARE_IDS`] ids fail without contacting the service.
pub fn compare<R: Retriever>(retriever: &R, ids: &[String]) -> Outcome {
    conclude(run_compare(retriever, ids).map(Payload::Compare))
}

/// Console table for a search payload, one row per material.
pub fn search_table(payload: &SearchPayload) -> String {
    render_console(&build_matrix(
        &payload.results,
        catalogue::SEARCH,
        Layout::EntityMajor,
    ))
}

/// Console table for a compare payload, one column per material.
pub fn comparison_table(payload: &ComparePayload) -> String {
    render_console(&build_matrix(
        &payload.comparison,
        catalogue::COMPARE,
        Layout::PropertyMajor,
    ))
}

/// File name of an export workbook. An explicit name wins, with `.xlsx`
/// appended when missing; otherwise the name comes from the requested ids or
/// formula followed by `stamp`. `id_list` marks ids given as a list, which are
/// named after the first id as a comparison.
pub fn export_file_name(
    explicit: Option<&str>,
    filter: &SearchFilter,
    id_list: bool,
    stamp: &str,
) -> String {
    if let Some(name) = explicit {
        let has_extension = Path::new(name)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"));
        return if has_extension {
            name.to_string()
        } else {
            format!("{name}.xlsx")
        };
    }

    match (filter.material_ids.first(), &filter.formula) {
        (Some(first), _) if id_list => format!("{first}_comparison_{stamp}.xlsx"),
        (Some(id), _) => format!("{id}_{stamp}.xlsx"),
        (None, Some(formula)) => format!("{formula}_{stamp}.xlsx"),
        (None, None) => format!("materials_export_{stamp}.xlsx"),
    }
}

fn conclude(result: Result<Payload>) -> Outcome {
    match result {
        Ok(payload) => Outcome::success(payload),
        Err(err) => {
            warn!(kind = err.kind(), error = %err, "use case failed");
            Outcome::failure(&err)
        }
    }
}

#[instrument(level = "info", skip_all, fields(limit = ?filter.limit))]
fn run_search<R: Retriever>(retriever: &R, filter: &SearchFilter) -> Result<SearchPayload> {
    let results = retrieve_records(retriever, filter, catalogue::SEARCH)?;
    Ok(SearchPayload {
        count: results.len(),
        query: filter.describe(),
        results,
    })
}

#[instrument(
    level = "info",
    skip_all,
    fields(output = %destination.display(), ids = filter.material_ids.len())
)]
fn run_export<R: Retriever>(
    retriever: &R,
    filter: &SearchFilter,
    destination: &Path,
) -> Result<ExportPayload> {
    let records = retrieve_records(retriever, filter, catalogue::EXPORT)?;
    if records.is_empty() {
        return Err(ToolError::EmptyResult);
    }

    let layout = Layout::select(filter.material_ids.len(), records.len());
    let matrix = build_matrix(&records, catalogue::EXPORT, layout);
    debug!(?layout, shape = ?matrix.shape(), "matrix constructed");
    ensure_parent_dir(destination)?;
    excel_write::write_workbook(destination, &matrix)?;

    Ok(ExportPayload {
        file_path: destination.display().to_string(),
        num_materials: records.len(),
    })
}

#[instrument(level = "info", skip_all, fields(ids = ids.len()))]
fn run_compare<R: Retriever>(retriever: &R, ids: &[String]) -> Result<ComparePayload> {
    if ids.len() < MIN_COMPARE_IDS {
        return Err(ToolError::Usage(format!(
            "Please provide at least {MIN_COMPARE_IDS} material IDs to compare"
        )));
    }

    let filter = SearchFilter::by_ids(ids);
    let comparison = retrieve_records(retriever, &filter, catalogue::COMPARE)?;
    if comparison.is_empty() {
        return Err(ToolError::EmptyResult);
    }

    Ok(ComparePayload {
        num_materials: comparison.len(),
        comparison,
    })
}

/// Creates the destination's directory once there is something to write.
fn ensure_parent_dir(destination: &Path) -> Result<()> {
    match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .map_err(|err| ToolError::Render(format!("cannot create {}: {err}", parent.display()))),
        _ => Ok(()),
    }
}

/// One batched fetch, then normalize and extract every document. The first
/// failing document aborts the whole batch.
fn retrieve_records<R: Retriever>(
    retriever: &R,
    filter: &SearchFilter,
    descriptors: &[PropertyDescriptor],
) -> Result<Vec<Record>> {
    let fields = catalogue::source_fields(descriptors);
    let documents = retriever.fetch(filter, &fields)?;
    info!(document_count = documents.len(), "retrieved documents");

    documents
        .iter()
        .map(|document| {
            let tree = normalize(document)?;
            Ok(build_record(&tree, descriptors))
        })
        .collect()
}
