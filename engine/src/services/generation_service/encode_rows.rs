// Parallel detail encoding: contiguous chunks on blocking tasks, each
// returning (position, outcome) pairs for the ordered merge.
use super::CancellationFlag;
use crate::assembler::{DetailError, DetailOutcome, FileAssembler};
use crate::error::{EngineError, Result};
use cnab_shared::InputRow;
use std::ops::Range;
use std::sync::Arc;
use tokio::task::JoinSet;

struct ChunkResult {
    outcomes: Vec<(usize, DetailOutcome)>,
    cancelled: bool,
}

pub async fn handle_encode_rows(
    assembler: Arc<FileAssembler>,
    rows: Arc<Vec<InputRow>>,
    workers: usize,
    cancel: CancellationFlag,
) -> Result<Vec<(usize, DetailOutcome)>> {
    let total = rows.len();
    let chunk_size = total.div_ceil(workers.max(1)).max(1);

    let mut tasks = JoinSet::new();
    for start in (0..total).step_by(chunk_size) {
        let range = start..(start + chunk_size).min(total);
        let assembler = Arc::clone(&assembler);
        let rows = Arc::clone(&rows);
        let cancel = cancel.clone();
        tasks.spawn_blocking(move || encode_chunk(&assembler, rows.as_slice(), range, &cancel));
    }
    tracing::debug!(rows = total, tasks = tasks.len(), chunk_size, "Encoding detail rows");

    let mut outcomes = Vec::with_capacity(total);
    let mut cancelled = false;
    while let Some(joined) = tasks.join_next().await {
        let chunk = match joined {
            Ok(Ok(chunk)) => chunk,
            Ok(Err(e)) => {
                tasks.abort_all();
                return Err(e);
            }
            Err(e) => {
                tasks.abort_all();
                return Err(EngineError::WorkerError(e.to_string()));
            }
        };
        cancelled |= chunk.cancelled;
        outcomes.extend(chunk.outcomes);
    }

    if cancelled {
        let encoded = outcomes.iter().filter(|(_, outcome)| outcome.is_ok()).count();
        tracing::warn!(encoded, attempted = total, "Generation cancelled");
        return Err(EngineError::Cancelled { encoded, attempted: total });
    }
    Ok(outcomes)
}

fn encode_chunk(
    assembler: &FileAssembler,
    rows: &[InputRow],
    range: Range<usize>,
    cancel: &CancellationFlag,
) -> Result<ChunkResult> {
    let mut outcomes = Vec::with_capacity(range.len());
    for position in range {
        if cancel.is_cancelled() {
            return Ok(ChunkResult { outcomes, cancelled: true });
        }
        match assembler.encode_detail(&rows[position], position) {
            Ok(record) => outcomes.push((position, Ok(record))),
            Err(DetailError::Row(failure)) => outcomes.push((position, Err(failure))),
            Err(DetailError::Fatal(e)) => return Err(e),
        }
    }
    Ok(ChunkResult { outcomes, cancelled: false })
}
