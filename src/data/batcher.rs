//! Burn batching for tabular items.

use std::sync::Arc;

use burn::{
    data::{
        dataloader::{DataLoader, DataLoaderBuilder, batcher::Batcher},
        dataset::InMemDataset,
    },
    tensor::{Tensor, backend::Backend},
};

use super::TabularItem;

/// Data loader yielding [`TabularBatch`]es.
pub type BatchLoader<B> = Arc<dyn DataLoader<TabularBatch<B>>>;

/// A batch of rows on a device.
#[derive(Clone, Debug)]
pub struct TabularBatch<B: Backend> {
    /// Features, shape `[batch_size, feature_size]`.
    pub features: Tensor<B, 2>,
    /// Labels, shape `[batch_size, 1]`.
    pub targets: Tensor<B, 2>,
}

/// Stacks [`TabularItem`]s into tensors on a fixed device.
#[derive(Clone, Debug)]
pub struct TabularBatcher<B: Backend> {
    device: B::Device,
}

impl<B: Backend> TabularBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<TabularItem, TabularBatch<B>> for TabularBatcher<B> {
    fn batch(&self, items: Vec<TabularItem>) -> TabularBatch<B> {
        let batch_size = items.len();
        let feature_size = items.first().map(|item| item.features.len()).unwrap_or(0);

        let features: Vec<f32> = items
            .iter()
            .flat_map(|item| item.features.iter().copied())
            .collect();
        let targets: Vec<f32> = items.iter().map(|item| item.label).collect();

        TabularBatch {
            features: Tensor::<B, 1>::from_floats(features.as_slice(), &self.device)
                .reshape([batch_size, feature_size]),
            targets: Tensor::<B, 1>::from_floats(targets.as_slice(), &self.device)
                .reshape([batch_size, 1]),
        }
    }
}

/// Builds a shuffling, single-threaded loader over `items`.
pub fn build_loader<B: Backend>(
    items: Vec<TabularItem>,
    batch_size: usize,
    seed: u64,
    device: &B::Device,
) -> BatchLoader<B> {
    DataLoaderBuilder::new(TabularBatcher::<B>::new(device.clone()))
        .batch_size(batch_size.max(1))
        .shuffle(seed)
        .build(InMemDataset::new(items))
}

/// Builds a loader that yields `items` in order, for repeatable evaluation.
pub fn build_eval_loader<B: Backend>(
    items: Vec<TabularItem>,
    batch_size: usize,
    device: &B::Device,
) -> BatchLoader<B> {
    DataLoaderBuilder::new(TabularBatcher::<B>::new(device.clone()))
        .batch_size(batch_size.max(1))
        .build(InMemDataset::new(items))
}
