//! The block ingestion monitor.

use crate::{
    BlockCreationListener, BlockCreationMonitorError, ClientError, ExecutionClient,
    LastProvenBlockNumberProvider,
};
use alloy_primitives::B256;
use async_trait::async_trait;
use coordinator_domain::{Block, BlockNumberAndHash};
use coordinator_service::PollingService;
use std::time::Duration;

/// A block delivered by the [`BlockCreationMonitor`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Constructor)]
pub struct BlockCreated {
    /// The created block.
    pub block: Block,
}

/// Configuration of the [`BlockCreationMonitor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockCreationMonitorConfig {
    /// The interval between two ticks.
    pub polling_interval: Duration,
    /// The number of confirmations a block needs before it is fetched.
    pub blocks_to_finalization: u64,
    /// The maximum number of blocks fetched per tick, and how far ingestion may run ahead of the
    /// last proven block.
    pub blocks_fetch_limit: u64,
}

impl Default for BlockCreationMonitorConfig {
    fn default() -> Self {
        Self {
            polling_interval: Duration::from_secs(1),
            blocks_to_finalization: 0,
            blocks_fetch_limit: 100,
        }
    }
}

/// Polls the execution chain and delivers new blocks to a [`BlockCreationListener`], in order
/// and exactly once unless the listener fails.
///
/// Each tick reads the chain head and the last proven block, then fetches blocks sequentially
/// from `next_block_number_to_fetch` up to
/// `min(head - blocks_to_finalization, next + blocks_fetch_limit - 1, last_proven +
/// blocks_fetch_limit)`. Every block must build on the previously accepted one; a mismatch
/// freezes the cursor until [`BlockCreationMonitor::reset`] is called.
#[derive(Debug)]
pub struct BlockCreationMonitor<C, P, L> {
    client: C,
    last_proven_block_provider: P,
    listener: L,
    config: BlockCreationMonitorConfig,
    next_block_number_to_fetch: u64,
    last_block_hash: B256,
}

impl<C, P, L> BlockCreationMonitor<C, P, L>
where
    C: ExecutionClient,
    P: LastProvenBlockNumberProvider,
    L: BlockCreationListener,
{
    /// Creates a monitor that resumes after `last_block`. Use [`Self::from_genesis`] to start at
    /// block `0`.
    pub const fn new(
        client: C,
        last_proven_block_provider: P,
        listener: L,
        config: BlockCreationMonitorConfig,
        last_block: BlockNumberAndHash,
    ) -> Self {
        Self {
            client,
            last_proven_block_provider,
            listener,
            config,
            next_block_number_to_fetch: last_block.number + 1,
            last_block_hash: last_block.hash,
        }
    }

    /// Creates a monitor that starts at block `0`, whose parent hash is zero.
    pub const fn from_genesis(
        client: C,
        last_proven_block_provider: P,
        listener: L,
        config: BlockCreationMonitorConfig,
    ) -> Self {
        Self {
            client,
            last_proven_block_provider,
            listener,
            config,
            next_block_number_to_fetch: 0,
            last_block_hash: B256::ZERO,
        }
    }

    /// Creates a monitor that resumes after `last_block_number`, reading that block's hash from
    /// the chain.
    pub async fn resume_after(
        client: C,
        last_proven_block_provider: P,
        listener: L,
        config: BlockCreationMonitorConfig,
        last_block_number: u64,
    ) -> Result<Self, ClientError> {
        let last_block = client.block_by_number(last_block_number).await?;
        info!(
            target: "ingestion",
            block_number = last_block_number,
            block_hash = %last_block.hash,
            "Resuming block ingestion"
        );
        Ok(Self::new(client, last_proven_block_provider, listener, config, last_block.id()))
    }

    /// Returns the number of the next block to fetch.
    pub const fn next_block_number_to_fetch(&self) -> u64 {
        self.next_block_number_to_fetch
    }

    /// Returns the hash of the last accepted block.
    pub const fn last_block_hash(&self) -> B256 {
        self.last_block_hash
    }

    /// Returns the configuration.
    pub const fn config(&self) -> &BlockCreationMonitorConfig {
        &self.config
    }

    /// Moves the cursor. The next tick fetches `next_block_number` and expects its parent hash to
    /// be `last_block_hash`.
    pub fn reset(&mut self, next_block_number: u64, last_block_hash: B256) {
        warn!(
            target: "ingestion",
            from = self.next_block_number_to_fetch,
            to = next_block_number,
            %last_block_hash,
            "Resetting block ingestion cursor"
        );
        self.next_block_number_to_fetch = next_block_number;
        self.last_block_hash = last_block_hash;
        coordinator_macros::set!(gauge, crate::Metrics::NEXT_BLOCK_TO_FETCH, next_block_number);
    }

    /// Returns the last block number that may be fetched this tick, if any.
    fn fetch_upper_bound(&self, head: u64, last_proven_block_number: u64) -> Option<u64> {
        let next = self.next_block_number_to_fetch;
        let fetch_limit = self.config.blocks_fetch_limit.max(1);
        let safe_head = head.checked_sub(self.config.blocks_to_finalization)?;
        let upper = safe_head
            .min(next.saturating_add(fetch_limit - 1))
            .min(last_proven_block_number.saturating_add(fetch_limit));
        (upper >= next).then_some(upper)
    }

    async fn ingest(&mut self, upper: u64) -> Result<(), BlockCreationMonitorError> {
        while self.next_block_number_to_fetch <= upper {
            let number = self.next_block_number_to_fetch;
            let block = self.client.block_by_number(number).await?;
            if block.number != number {
                return Err(BlockCreationMonitorError::UnexpectedBlock {
                    requested: number,
                    returned: block.number,
                });
            }
            if block.parent_hash != self.last_block_hash {
                coordinator_macros::inc!(counter, crate::Metrics::REORGS_DETECTED);
                return Err(BlockCreationMonitorError::ReorgDetected {
                    block_number: number,
                    expected_parent_hash: self.last_block_hash,
                    actual_parent_hash: block.parent_hash,
                });
            }

            let hash = block.hash;
            self.listener.accept_block(BlockCreated::new(block)).await.map_err(|source| {
                coordinator_macros::inc!(counter, crate::Metrics::LISTENER_FAILURES);
                BlockCreationMonitorError::Listener { block_number: number, source }
            })?;

            debug!(target: "ingestion", block_number = number, block_hash = %hash, "Block delivered");
            self.last_block_hash = hash;
            self.next_block_number_to_fetch = number + 1;
            coordinator_macros::set!(
                gauge,
                crate::Metrics::NEXT_BLOCK_TO_FETCH,
                self.next_block_number_to_fetch
            );
        }
        Ok(())
    }
}

#[async_trait]
impl<C, P, L> PollingService for BlockCreationMonitor<C, P, L>
where
    C: ExecutionClient + 'static,
    P: LastProvenBlockNumberProvider + 'static,
    L: BlockCreationListener + 'static,
{
    type Error = BlockCreationMonitorError;

    fn name(&self) -> &'static str {
        "block_creation_monitor"
    }

    async fn action(&mut self) -> Result<(), Self::Error> {
        let head = self.client.block_number().await?;
        let last_proven = self.last_proven_block_provider.last_proven_block_number().await?;

        let Some(upper) = self.fetch_upper_bound(head, last_proven) else {
            trace!(
                target: "ingestion",
                head,
                last_proven,
                next = self.next_block_number_to_fetch,
                "No block to fetch"
            );
            return Ok(());
        };
        self.ingest(upper).await
    }

    fn handle_error(&mut self, error: Self::Error) {
        match error {
            BlockCreationMonitorError::ReorgDetected { block_number, .. } => {
                error!(target: "ingestion", block_number, %error, "Block ingestion halted");
            }
            error => {
                warn!(
                    target: "ingestion",
                    next = self.next_block_number_to_fetch,
                    %error,
                    "Block ingestion tick failed, retrying next tick"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        BlockCreationListenerError, LastProvenBlock,
        traits::{
            MockBlockCreationListener, MockExecutionClient, MockLastProvenBlockNumberProvider,
        },
    };
    use coordinator_service::PeriodicPollingService;
    use mockall::Sequence;
    use std::{
        collections::HashMap,
        sync::{
            Arc, Mutex,
            atomic::{AtomicU64, AtomicUsize, Ordering},
        },
    };

    const START: u64 = 100;

    fn hash(number: u64) -> B256 {
        B256::left_padding_from(&(number + 0x1000).to_be_bytes())
    }

    fn block(number: u64) -> Block {
        Block {
            number,
            hash: hash(number),
            parent_hash: hash(number - 1),
            timestamp: number * 2,
            ..Default::default()
        }
    }

    fn config() -> BlockCreationMonitorConfig {
        BlockCreationMonitorConfig {
            polling_interval: Duration::from_millis(100),
            blocks_to_finalization: 2,
            blocks_fetch_limit: 5,
        }
    }

    /// A chain of [`block`]s whose head, fetch latency and failures are driven by the test.
    #[derive(Debug, Default)]
    struct FakeChain {
        head: AtomicU64,
        overrides: Mutex<HashMap<u64, Block>>,
        fetched: Mutex<Vec<u64>>,
        head_failures: AtomicUsize,
        fetch_failures: AtomicUsize,
        fetch_delay: Mutex<Option<Duration>>,
    }

    impl FakeChain {
        fn with_head(head: u64) -> Arc<Self> {
            Arc::new(Self { head: AtomicU64::new(head), ..Default::default() })
        }

        fn fetched(&self) -> Vec<u64> {
            self.fetched.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ExecutionClient for FakeChain {
        async fn block_number(&self) -> Result<u64, ClientError> {
            if self.head_failures.load(Ordering::SeqCst) > 0 {
                self.head_failures.fetch_sub(1, Ordering::SeqCst);
                return Err(ClientError::Rpc("connection refused".to_string()));
            }
            Ok(self.head.load(Ordering::SeqCst))
        }

        async fn block_by_number(&self, number: u64) -> Result<Block, ClientError> {
            let delay = self.fetch_delay.lock().unwrap().take();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if self.fetch_failures.load(Ordering::SeqCst) > 0 {
                self.fetch_failures.fetch_sub(1, Ordering::SeqCst);
                return Err(ClientError::Rpc("connection reset".to_string()));
            }
            self.fetched.lock().unwrap().push(number);
            let overridden = self.overrides.lock().unwrap().get(&number).cloned();
            Ok(overridden.unwrap_or_else(|| block(number)))
        }
    }

    /// Records delivered blocks and fails the first `failures` deliveries.
    #[derive(Debug, Default)]
    struct RecordingListener {
        accepted: Mutex<Vec<Block>>,
        attempts: AtomicUsize,
        failures: AtomicUsize,
    }

    impl RecordingListener {
        fn accepted_numbers(&self) -> Vec<u64> {
            self.accepted.lock().unwrap().iter().map(|block| block.number).collect()
        }
    }

    #[async_trait]
    impl BlockCreationListener for RecordingListener {
        async fn accept_block(&self, event: BlockCreated) -> Result<(), BlockCreationListenerError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if self.failures.load(Ordering::SeqCst) > 0 {
                self.failures.fetch_sub(1, Ordering::SeqCst);
                return Err(BlockCreationListenerError::new("listener unavailable"));
            }
            self.accepted.lock().unwrap().push(event.block);
            Ok(())
        }
    }

    type TestMonitor = BlockCreationMonitor<Arc<FakeChain>, LastProvenBlock, Arc<RecordingListener>>;

    fn monitor(
        chain: &Arc<FakeChain>,
        listener: &Arc<RecordingListener>,
        last_proven: &LastProvenBlock,
    ) -> TestMonitor {
        BlockCreationMonitor::new(
            Arc::clone(chain),
            last_proven.clone(),
            Arc::clone(listener),
            config(),
            BlockNumberAndHash { number: START - 1, hash: hash(START - 1) },
        )
    }

    #[tokio::test]
    async fn test_notifies_listener_once_block_is_finalized() {
        let mut client = MockExecutionClient::new();
        let mut seq = Sequence::new();
        client.expect_block_number().times(1).in_sequence(&mut seq).returning(|| Ok(START + 2));
        client
            .expect_block_by_number()
            .withf(|number| *number == START)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|number| Ok(block(number)));
        client.expect_block_number().times(1).in_sequence(&mut seq).returning(|| Ok(START + 3));
        client
            .expect_block_by_number()
            .withf(|number| *number == START + 1)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|number| Ok(block(number)));

        let mut listener = MockBlockCreationListener::new();
        listener
            .expect_accept_block()
            .withf(|event| event.block == block(START))
            .times(1)
            .returning(|_| Ok(()));
        listener
            .expect_accept_block()
            .withf(|event| event.block == block(START + 1))
            .times(1)
            .returning(|_| Ok(()));

        let mut monitor = BlockCreationMonitor::new(
            client,
            LastProvenBlock::new(START),
            listener,
            config(),
            BlockNumberAndHash { number: START - 1, hash: hash(START - 1) },
        );

        monitor.action().await.unwrap();
        assert_eq!(monitor.next_block_number_to_fetch(), START + 1);
        monitor.action().await.unwrap();
        assert_eq!(monitor.next_block_number_to_fetch(), START + 2);
        assert_eq!(monitor.last_block_hash(), hash(START + 1));
    }

    #[tokio::test]
    async fn test_does_not_fetch_before_finalization() {
        let mut client = MockExecutionClient::new();
        client.expect_block_number().returning(|| Ok(START + 1));
        client.expect_block_by_number().never();
        let mut listener = MockBlockCreationListener::new();
        listener.expect_accept_block().never();

        let mut monitor = BlockCreationMonitor::new(
            client,
            LastProvenBlock::new(START),
            listener,
            config(),
            BlockNumberAndHash { number: START - 1, hash: hash(START - 1) },
        );

        for _ in 0..3 {
            monitor.action().await.unwrap();
        }
        assert_eq!(monitor.next_block_number_to_fetch(), START);
    }

    #[tokio::test]
    async fn test_listener_failure_retries_same_block() {
        let chain = FakeChain::with_head(START + 2);
        let listener = Arc::new(RecordingListener::default());
        listener.failures.store(3, Ordering::SeqCst);
        let mut monitor = monitor(&chain, &listener, &LastProvenBlock::new(START));

        for _ in 0..3 {
            let err = monitor.action().await.unwrap_err();
            assert!(matches!(
                err,
                BlockCreationMonitorError::Listener { block_number: START, .. }
            ));
            assert_eq!(monitor.next_block_number_to_fetch(), START);
        }

        monitor.action().await.unwrap();
        assert_eq!(listener.attempts.load(Ordering::SeqCst), 4);
        assert_eq!(listener.accepted_numbers(), vec![START]);
        assert_eq!(monitor.next_block_number_to_fetch(), START + 1);
    }

    #[tokio::test]
    async fn test_is_resilient_to_connection_failures() {
        let chain = FakeChain::with_head(START + 2);
        chain.head_failures.store(1, Ordering::SeqCst);
        chain.fetch_failures.store(1, Ordering::SeqCst);
        let listener = Arc::new(RecordingListener::default());
        let mut monitor = monitor(&chain, &listener, &LastProvenBlock::new(START));

        assert!(matches!(monitor.action().await, Err(BlockCreationMonitorError::Client(_))));
        assert!(matches!(monitor.action().await, Err(BlockCreationMonitorError::Client(_))));
        assert_eq!(monitor.next_block_number_to_fetch(), START);

        monitor.action().await.unwrap();
        assert_eq!(listener.accepted_numbers(), vec![START]);
        assert_eq!(monitor.next_block_number_to_fetch(), START + 1);
    }

    #[tokio::test]
    async fn test_last_proven_failure_skips_tick() {
        let chain = FakeChain::with_head(START + 2);
        let listener = Arc::new(RecordingListener::default());
        let mut last_proven = MockLastProvenBlockNumberProvider::new();
        let mut seq = Sequence::new();
        last_proven
            .expect_last_proven_block_number()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Err(ClientError::Rpc("connection refused".to_string())));
        last_proven
            .expect_last_proven_block_number()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(START));

        let mut monitor = BlockCreationMonitor::new(
            Arc::clone(&chain),
            last_proven,
            Arc::clone(&listener),
            config(),
            BlockNumberAndHash { number: START - 1, hash: hash(START - 1) },
        );

        assert!(matches!(monitor.action().await, Err(BlockCreationMonitorError::Client(_))));
        assert!(chain.fetched().is_empty());
        assert_eq!(listener.attempts.load(Ordering::SeqCst), 0);
        assert_eq!(monitor.next_block_number_to_fetch(), START);

        monitor.action().await.unwrap();
        assert_eq!(chain.fetched(), vec![START]);
        assert_eq!(listener.accepted_numbers(), vec![START]);
        assert_eq!(monitor.next_block_number_to_fetch(), START + 1);
    }

    #[tokio::test]
    async fn test_reorg_freezes_cursor_until_reset() {
        let chain = FakeChain::with_head(START + 3);
        let forked = Block { parent_hash: B256::repeat_byte(0xAB), ..block(START + 1) };
        chain.overrides.lock().unwrap().insert(START + 1, forked.clone());
        let listener = Arc::new(RecordingListener::default());
        let mut monitor = monitor(&chain, &listener, &LastProvenBlock::new(START));

        let err = monitor.action().await.unwrap_err();
        assert_eq!(
            err,
            BlockCreationMonitorError::ReorgDetected {
                block_number: START + 1,
                expected_parent_hash: hash(START),
                actual_parent_hash: forked.parent_hash,
            }
        );
        assert_eq!(listener.accepted_numbers(), vec![START]);
        assert_eq!(monitor.next_block_number_to_fetch(), START + 1);

        // Still frozen on the next tick.
        assert!(monitor.action().await.is_err());
        assert_eq!(monitor.next_block_number_to_fetch(), START + 1);

        monitor.reset(START + 1, forked.parent_hash);
        monitor.action().await.unwrap();
        assert_eq!(listener.accepted_numbers(), vec![START, START + 1]);
        assert_eq!(monitor.next_block_number_to_fetch(), START + 2);
    }

    #[tokio::test]
    async fn test_fetch_window_is_bounded_by_last_proven_block() {
        let chain = FakeChain::with_head(START + 50);
        let listener = Arc::new(RecordingListener::default());
        let last_proven = LastProvenBlock::new(START);
        let mut monitor = monitor(&chain, &listener, &last_proven);

        // First tick is capped by the fetch limit.
        monitor.action().await.unwrap();
        assert_eq!(listener.accepted_numbers(), (START..START + 5).collect::<Vec<_>>());

        // Then by last proven + fetch limit.
        monitor.action().await.unwrap();
        monitor.action().await.unwrap();
        assert_eq!(listener.accepted_numbers(), (START..=START + 5).collect::<Vec<_>>());
        assert_eq!(monitor.next_block_number_to_fetch(), START + 6);

        last_proven.update(START + 1);
        monitor.action().await.unwrap();
        assert_eq!(listener.accepted_numbers(), (START..=START + 6).collect::<Vec<_>>());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_fetches_are_delivered_in_order() {
        let chain = FakeChain::with_head(START + 2);
        *chain.fetch_delay.lock().unwrap() = Some(config().polling_interval * 2);
        let listener = Arc::new(RecordingListener::default());
        let mut poller = PeriodicPollingService::new(
            monitor(&chain, &listener, &LastProvenBlock::new(START)),
            config().polling_interval,
        );

        poller.start();
        tokio::time::sleep(Duration::from_millis(250)).await;
        chain.head.store(START + 3, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(250)).await;
        poller.stop().await;

        assert_eq!(listener.accepted_numbers(), vec![START, START + 1]);
        assert_eq!(chain.fetched(), vec![START, START + 1]);
        assert_eq!(poller.service().lock().await.next_block_number_to_fetch(), START + 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_and_stop_are_idempotent() {
        let chain = FakeChain::with_head(START + 2);
        let listener = Arc::new(RecordingListener::default());
        let mut poller = PeriodicPollingService::new(
            monitor(&chain, &listener, &LastProvenBlock::new(START)),
            config().polling_interval,
        );

        poller.start();
        poller.start();
        tokio::time::sleep(Duration::from_millis(250)).await;
        poller.stop().await;
        poller.stop().await;

        chain.head.store(START + 10, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(listener.accepted_numbers(), vec![START]);
    }
}
