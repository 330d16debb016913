use std::sync::Arc;

use crate::acquisition::{AcquireResult, MediaAcquisitionService};
use crate::assets::{AssetStore, FileDescriptor};
use crate::av::{ClipProducer, MediaProbe};
use crate::command::CommandExecutor;
use crate::config::ClipperConfig;
use crate::prepare::ClipPreparer;
use crate::progress::ProgressBus;
use crate::tasks::TaskRegistry;

/// The process-wide services, built once at startup and shared by handle.
/// Cloning is cheap and every clone sees the same registry and bus.
#[derive(Clone)]
pub struct ClipperContext {
    config: Arc<ClipperConfig>,
    assets: AssetStore,
    bus: ProgressBus,
    registry: TaskRegistry<FileDescriptor>,
    probe: MediaProbe,
    producer: ClipProducer,
    acquisition: MediaAcquisitionService,
}

impl ClipperContext {
    pub fn new(config: ClipperConfig) -> AcquireResult<Self> {
        let assets = AssetStore::new(&config.paths.asset_root);
        let bus = ProgressBus::new(config.progress.channel_capacity);
        let registry = TaskRegistry::new(config.tasks.finished_retention());
        let probe = MediaProbe::new(&config.tools);
        let producer = ClipProducer::new(
            &config.tools,
            config.encode.clone(),
            assets.clone(),
            probe.clone(),
        );
        let acquisition = MediaAcquisitionService::new(&config.download, assets.clone(), bus.clone())?;
        Ok(Self {
            config: Arc::new(config),
            assets,
            bus,
            registry,
            probe,
            producer,
            acquisition,
        })
    }

    /// Routes every media tool invocation through `executor`.
    pub fn with_executor(mut self, executor: Arc<dyn CommandExecutor>) -> Self {
        self.probe = self.probe.with_executor(Arc::clone(&executor));
        self.producer = self.producer.with_executor(executor);
        self
    }

    pub fn config(&self) -> &ClipperConfig {
        &self.config
    }

    pub fn assets(&self) -> &AssetStore {
        &self.assets
    }

    pub fn bus(&self) -> &ProgressBus {
        &self.bus
    }

    pub fn registry(&self) -> &TaskRegistry<FileDescriptor> {
        &self.registry
    }

    pub fn probe(&self) -> &MediaProbe {
        &self.probe
    }

    pub fn producer(&self) -> &ClipProducer {
        &self.producer
    }

    pub fn acquisition(&self) -> &MediaAcquisitionService {
        &self.acquisition
    }

    pub fn preparer(&self) -> ClipPreparer {
        ClipPreparer::new(
            self.probe.clone(),
            self.assets.clone(),
            self.acquisition.clone(),
            self.registry.clone(),
        )
    }
}
