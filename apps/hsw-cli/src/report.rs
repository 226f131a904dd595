//! Build, query and collect results for output.

use crate::config::CliConfig;
use crate::source::{load_dataset, random_vector};
use crate::CliError;
use hsw_index::{GraphSnapshot, HswConfig, HswIndex, QueryResult, QueryTrace};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Everything one driver run prints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub config: HswConfig,
    pub nodes: usize,
    pub dimensions: usize,
    /// Members per level, bottom first
    pub level_sizes: Vec<usize>,
    pub queries: Vec<QueryReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<GraphSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryReport {
    pub query: Vec<f32>,
    pub result: QueryResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<QueryTrace>,
}

/// Build the configured index and answer its queries.
///
/// With `index.seed` set, the dataset, the graph and every query start are
/// reproducible.
pub fn run(config: &CliConfig) -> Result<Report, CliError> {
    config.validate()?;

    // Dataset and query draws get their own stream so they don't shift
    // the index's sampling sequence
    let mut rng = match config.index.seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
        None => StdRng::from_entropy(),
    };

    let dataset = load_dataset(&config.dataset, &mut rng)?;
    let nodes = dataset.len();
    let dimensions = dataset.dimensions();

    let queries = if config.queries.is_empty() {
        vec![random_vector(&mut rng, dimensions)]
    } else {
        config.queries.clone()
    };

    let index = HswIndex::new(config.index.clone())?;
    index.build(dataset)?;
    let graph = index.graph()?;
    let level_sizes: Vec<usize> = graph.levels().iter().map(|l| l.len()).collect();
    tracing::info!(nodes, levels = level_sizes.len(), ?level_sizes, "index ready");

    let mut reports = Vec::with_capacity(queries.len());
    for query in queries {
        let (result, trace) = if config.trace {
            let (result, trace) = index.query_traced(&query)?;
            (result, Some(trace))
        } else {
            (index.query(&query)?, None)
        };
        tracing::info!(node = result.node_id, distance = result.distance, "query answered");
        reports.push(QueryReport {
            query,
            result,
            trace,
        });
    }

    Ok(Report {
        config: config.index.clone(),
        nodes,
        dimensions,
        level_sizes,
        queries: reports,
        snapshot: config.snapshot.then(|| graph.snapshot()),
    })
}
