use std::fmt;

use block_header::verify_header_json;
use futures::future::try_join_all;
use thiserror::Error;
use tracing::{debug, error, info, instrument};

use crate::model::errors::{ErrorKind, ProofError};
use crate::model::eth_rpc::BlockSelector;
use crate::model::target::ProofTarget;
use crate::rpc::EthRpc;
use crate::service::bundle::{EncodedBundle, ProofBundle, ProofGroup, ProofLayout};
use crate::service::fetch_proof::fetch_proof;

/// Progress of one pipeline run. Failure is terminal and is reported as a
/// [`PipelineError`] carrying the last stage reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineStage {
    Idle,
    HeaderFetched,
    HeaderVerified,
    ProofsFetched,
    Decoded,
    Encoded,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Error)]
#[error("Pipeline failed after {reached}: {source}")]
pub struct PipelineError {
    pub reached: PipelineStage,
    #[source]
    pub source: ProofError,
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }
}

/// What to prove: a block, the accounts (with their slots) in output order,
/// and the proof-section layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProofRequest {
    pub block: BlockSelector,
    pub targets: Vec<ProofTarget>,
    pub layout: ProofLayout,
}

impl ProofRequest {
    pub fn new(block: BlockSelector, targets: Vec<ProofTarget>) -> Self {
        Self {
            block,
            targets,
            layout: ProofLayout::default(),
        }
    }

    pub fn with_layout(mut self, layout: ProofLayout) -> Self {
        self.layout = layout;
        self
    }
}

pub struct ProofPipeline<R> {
    rpc: R,
}

impl<R: EthRpc> ProofPipeline<R> {
    pub fn new(rpc: R) -> Self {
        Self { rpc }
    }

    /// Runs a request to completion.
    ///
    /// The header is fetched and verified before any proof is requested, and
    /// all proofs are requested at the verified block number. Proof requests
    /// run concurrently; groups are assembled in target order. Any failure
    /// aborts the run and drops the in-flight requests.
    #[instrument(skip(self, request), fields(block = %request.block, targets = request.targets.len()))]
    pub async fn run(&self, request: &ProofRequest) -> Result<EncodedBundle, PipelineError> {
        let mut stage = PipelineStage::Idle;
        let result = self.run_stages(request, &mut stage).await;
        match &result {
            Ok(encoded) => info!(
                block = encoded.block_number(),
                header_len = encoded.header.len(),
                proofs_len = encoded.proofs.len(),
                "Proof bundle encoded"
            ),
            Err(err) => error!(reached = %err.reached, kind = ?err.kind(), "{}", err.source),
        }
        result
    }

    async fn run_stages(
        &self,
        request: &ProofRequest,
        stage: &mut PipelineStage,
    ) -> Result<EncodedBundle, PipelineError> {
        let fail = |reached: PipelineStage| move |source: ProofError| PipelineError { reached, source };

        if request.targets.is_empty() {
            return Err(fail(*stage)(ProofError::InvalidRequest(
                "at least one proof target is required".to_string(),
            )));
        }

        let block_json = self
            .rpc
            .get_block_by_number(&request.block)
            .await
            .map_err(|e| fail(*stage)(e.into()))?;
        advance(stage, PipelineStage::HeaderFetched);

        let header = verify_header_json(&block_json).map_err(|e| fail(*stage)(e.into()))?;
        advance(stage, PipelineStage::HeaderVerified);

        let block_number = header.number();
        let raw_proofs = try_join_all(
            request
                .targets
                .iter()
                .map(|target| fetch_proof(&self.rpc, block_number, target)),
        )
        .await
        .map_err(fail(*stage))?;
        advance(stage, PipelineStage::ProofsFetched);

        let groups = raw_proofs
            .into_iter()
            .map(ProofGroup::decode)
            .collect::<Result<Vec<_>, _>>()
            .map_err(fail(*stage))?;
        advance(stage, PipelineStage::Decoded);

        let encoded = ProofBundle::new(header, groups).encode(request.layout);
        advance(stage, PipelineStage::Encoded);
        Ok(encoded)
    }
}

fn advance(stage: &mut PipelineStage, next: PipelineStage) {
    debug!(from = %stage, to = %next, "Pipeline stage transition");
    *stage = next;
}
