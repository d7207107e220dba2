//! Sequential packing of furniture along the x axis.
//!
//! Each item's offset is the previous item's offset plus the previous
//! item's resolved width, so assets are resolved one at a time in order.
//! A failed or timed-out resolution stops the pass at that index; every
//! item before it keeps its placement.

use crate::config::{EditorConfig, PlacementOrigin};
use crate::error::{AssetError, LayoutError, LayoutResult};
use crate::model::{AssetKind, ItemId, LayoutModel};
use futures_util::future::{select, Either};
use futures_util::stream::{self, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Boxed future for loader and timer callbacks.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Result type for asset resolution.
pub type AssetResult<T> = Result<T, AssetError>;

/// Axis-aligned bounding box extents of a resolved asset.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoxSize {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

impl BoxSize {
    pub const fn new(width: f64, height: f64, depth: f64) -> Self {
        Self { width, height, depth }
    }
}

/// Which sub-asset of an item is being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetPart {
    /// The item's only mesh, or the top mesh of a composite item.
    Primary,
    /// The stacked lower mesh of a composite item.
    Secondary,
}

/// A request handed to the [`AssetLoader`].
#[derive(Debug, Clone, PartialEq)]
pub struct AssetRequest {
    /// Position in placement order.
    pub index: usize,
    pub item_id: ItemId,
    pub kind: AssetKind,
    pub part: AssetPart,
}

/// A loaded asset: its bounding box and whatever the renderer needs to draw it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAsset<H> {
    pub size: BoxSize,
    pub handle: H,
}

/// Resolves asset kinds to loaded assets.
///
/// Mesh decoding, paths and formats live entirely behind this trait.
pub trait AssetLoader {
    type Handle;

    fn resolve(&self, request: &AssetRequest) -> BoxFuture<'_, AssetResult<ResolvedAsset<Self::Handle>>>;
}

/// Source of delays for per-item timeouts.
pub trait Timer {
    fn sleep(&self, duration: Duration) -> BoxFuture<'_, ()>;
}

/// Offsets for items with the given widths, starting at `origin`.
///
/// `offset[0] = origin` and `offset[i] = offset[i - 1] + widths[i - 1]`.
pub fn solve_offsets(origin: f64, widths: &[f64]) -> Vec<f64> {
    let mut offset = origin;
    widths
        .iter()
        .map(|width| {
            let current = offset;
            offset += width;
            current
        })
        .collect()
}

/// Origin of a placement pass for the given model.
pub fn placement_origin(model: &LayoutModel, origin: PlacementOrigin) -> f64 {
    match origin {
        PlacementOrigin::Zero => 0.0,
        PlacementOrigin::PolygonMinX => model.room().min_x(),
    }
}

/// One item queued for placement.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementItem {
    pub item_id: ItemId,
    pub kind: AssetKind,
    pub is_composite: bool,
}

/// A placed item.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement<H> {
    pub index: usize,
    pub item_id: ItemId,
    pub kind: AssetKind,
    pub offset: f64,
    /// Width the item contributed to the running offset.
    pub width: f64,
    pub size: BoxSize,
    pub handle: H,
    /// Lower mesh of a composite item; drawn at the same offset.
    pub secondary: Option<ResolvedAsset<H>>,
}

impl<H> Placement<H> {
    pub fn is_composite(&self) -> bool {
        self.secondary.is_some()
    }
}

/// Outcome of a full placement pass.
#[derive(Debug)]
pub struct PlacementReport<H> {
    /// Items placed, in order, up to the first failure.
    pub placed: Vec<Placement<H>>,
    /// The failure that stopped the pass, if any.
    pub failure: Option<LayoutError>,
}

impl<H> PlacementReport<H> {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }

    /// Index of the item that failed to resolve.
    pub fn failed_index(&self) -> Option<usize> {
        match self.failure {
            Some(LayoutError::AssetLoadFailure { index, .. }) => Some(index),
            _ => None,
        }
    }

    pub fn offsets(&self) -> Vec<f64> {
        self.placed.iter().map(|placement| placement.offset).collect()
    }

    pub fn placement(&self, item_id: ItemId) -> Option<&Placement<H>> {
        self.placed.iter().find(|placement| placement.item_id == item_id)
    }
}

/// Resolves and places a sequence of items, one at a time.
pub struct PlacementPipeline<'a, L: AssetLoader, T: Timer> {
    loader: &'a L,
    timer: &'a T,
    items: Vec<PlacementItem>,
    origin: f64,
    timeout: Duration,
}

impl<'a, L: AssetLoader, T: Timer> PlacementPipeline<'a, L, T> {
    pub fn new(loader: &'a L, timer: &'a T, items: Vec<PlacementItem>, origin: f64, timeout: Duration) -> Self {
        Self {
            loader,
            timer,
            items,
            origin,
            timeout,
        }
    }

    /// Queue every item of the model, ordered by ascending x.
    pub fn for_model(model: &LayoutModel, config: &EditorConfig, loader: &'a L, timer: &'a T) -> Self {
        let items = model
            .items_by_x()
            .into_iter()
            .map(|item| PlacementItem {
                item_id: item.id(),
                kind: item.kind.clone(),
                is_composite: item.is_composite,
            })
            .collect();
        Self::new(
            loader,
            timer,
            items,
            placement_origin(model, config.placement_origin),
            Duration::from_millis(config.asset_timeout_ms),
        )
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Placements in order. The stream ends after the first error.
    pub fn stream(self) -> impl Stream<Item = LayoutResult<Placement<L::Handle>>> + 'a {
        let origin = self.origin;
        stream::unfold(Some((self, 0usize, origin)), |state| async move {
            let Some((pipeline, index, offset)) = state else {
                return None;
            };
            let Some(item) = pipeline.items.get(index).cloned() else {
                return None;
            };

            match pipeline.place(index, &item, offset).await {
                Ok(placement) => {
                    let next = offset + placement.width;
                    Some((Ok(placement), Some((pipeline, index + 1, next))))
                }
                Err(source) => {
                    log::warn!("placement stopped at index {index} ({}): {source}", item.kind);
                    let error = LayoutError::AssetLoadFailure {
                        index,
                        item_id: item.item_id,
                        source,
                    };
                    Some((Err(error), None))
                }
            }
        })
    }

    /// Drive the pass to completion and collect the outcome.
    pub async fn run(self) -> PlacementReport<L::Handle> {
        let total = self.items.len();
        log::info!("placing {total} items from x = {}", self.origin);

        let stream = self.stream();
        futures_util::pin_mut!(stream);

        let mut report = PlacementReport {
            placed: Vec::with_capacity(total),
            failure: None,
        };
        while let Some(result) = stream.next().await {
            match result {
                Ok(placement) => report.placed.push(placement),
                Err(err) => {
                    report.failure = Some(err);
                    break;
                }
            }
        }

        log::info!("placed {} of {total} items", report.placed.len());
        report
    }

    async fn place(&self, index: usize, item: &PlacementItem, offset: f64) -> AssetResult<Placement<L::Handle>> {
        let primary = self.resolve(index, item, AssetPart::Primary).await?;
        let width = primary.size.width;
        if !width.is_finite() || width < 0.0 {
            return Err(AssetError::InvalidSize(width));
        }

        let secondary = if item.is_composite {
            Some(self.resolve(index, item, AssetPart::Secondary).await?)
        } else {
            None
        };

        log::debug!("placed {} at x = {offset} (width {width})", item.kind);
        Ok(Placement {
            index,
            item_id: item.item_id,
            kind: item.kind.clone(),
            offset,
            width,
            size: primary.size,
            handle: primary.handle,
            secondary,
        })
    }

    async fn resolve(&self, index: usize, item: &PlacementItem, part: AssetPart) -> AssetResult<ResolvedAsset<L::Handle>> {
        let request = AssetRequest {
            index,
            item_id: item.item_id,
            kind: item.kind.clone(),
            part,
        };
        let load = self.loader.resolve(&request);
        let deadline = self.timer.sleep(self.timeout);
        match select(load, deadline).await {
            Either::Left((result, _)) => result,
            Either::Right(((), _)) => Err(AssetError::TimedOut(self.timeout.as_millis() as u64)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Resolves widths from a table; records every request in order.
    struct TableLoader {
        widths: HashMap<(String, AssetPart), f64>,
        failing: Option<String>,
        stalled: Option<String>,
        requests: RefCell<Vec<(usize, AssetPart)>>,
    }

    impl TableLoader {
        fn new(entries: &[(&str, AssetPart, f64)]) -> Self {
            Self {
                widths: entries
                    .iter()
                    .map(|&(kind, part, width)| ((kind.to_string(), part), width))
                    .collect(),
                failing: None,
                stalled: None,
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl AssetLoader for TableLoader {
        type Handle = String;

        fn resolve(&self, request: &AssetRequest) -> BoxFuture<'_, AssetResult<ResolvedAsset<String>>> {
            self.requests.borrow_mut().push((request.index, request.part));
            let kind = request.kind.as_str().to_string();
            if self.stalled.as_deref() == Some(kind.as_str()) {
                return Box::pin(std::future::pending());
            }
            let result = if self.failing.as_deref() == Some(kind.as_str()) {
                Err(AssetError::Failed(format!("{kind} is corrupt")))
            } else {
                self.widths
                    .get(&(kind.clone(), request.part))
                    .map(|&width| ResolvedAsset {
                        size: BoxSize::new(width, 1.0, 1.0),
                        handle: format!("{kind}/{:?}", request.part),
                    })
                    .ok_or(AssetError::NotFound(kind))
            };
            Box::pin(async move { result })
        }
    }

    /// Never fires.
    struct NeverTimer;

    impl Timer for NeverTimer {
        fn sleep(&self, _duration: Duration) -> BoxFuture<'_, ()> {
            Box::pin(std::future::pending())
        }
    }

    /// Fires immediately.
    struct ExpiredTimer;

    impl Timer for ExpiredTimer {
        fn sleep(&self, _duration: Duration) -> BoxFuture<'_, ()> {
            Box::pin(async {})
        }
    }

    fn items(kinds: &[(&str, bool)]) -> Vec<PlacementItem> {
        kinds
            .iter()
            .map(|&(kind, is_composite)| PlacementItem {
                item_id: ItemId::new_v4(),
                kind: AssetKind::from(kind),
                is_composite,
            })
            .collect()
    }

    fn run<L: AssetLoader, T: Timer>(loader: &L, timer: &T, queue: Vec<PlacementItem>) -> PlacementReport<L::Handle> {
        let pipeline = PlacementPipeline::new(loader, timer, queue, 0.0, Duration::from_millis(5000));
        pollster::block_on(pipeline.run())
    }

    proptest! {
        #[test]
        fn offsets_follow_previous_width(
            origin in -1.0e3f64..1.0e3,
            widths in prop::collection::vec(0.0f64..100.0, 0..40),
        ) {
            let offsets = solve_offsets(origin, &widths);
            prop_assert_eq!(offsets.len(), widths.len());
            if let Some(&first) = offsets.first() {
                prop_assert_eq!(first, origin);
            }
            for i in 1..offsets.len() {
                prop_assert_eq!(offsets[i], offsets[i - 1] + widths[i - 1]);
                prop_assert!(offsets[i] >= offsets[i - 1]);
            }
        }
    }

    #[test]
    fn test_solve_offsets() {
        assert_eq!(solve_offsets(0.0, &[2.0, 1.0, 3.0]), vec![0.0, 2.0, 3.0]);
        assert_eq!(solve_offsets(-3.0, &[1.0, 1.0]), vec![-3.0, -2.0]);
        assert!(solve_offsets(0.0, &[]).is_empty());
    }

    #[test]
    fn test_pipeline_packs_by_width() {
        let loader = TableLoader::new(&[
            ("a", AssetPart::Primary, 2.0),
            ("b", AssetPart::Primary, 1.0),
            ("c", AssetPart::Primary, 3.0),
        ]);
        let report = run(&loader, &NeverTimer, items(&[("a", false), ("b", false), ("c", false)]));

        assert!(report.is_complete());
        assert_eq!(report.offsets(), vec![0.0, 2.0, 3.0]);
        assert_eq!(report.placed[2].handle, "c/Primary");
    }

    #[test]
    fn test_composite_contributes_primary_width_only() {
        let loader = TableLoader::new(&[
            ("oven", AssetPart::Primary, 2.0),
            ("oven", AssetPart::Secondary, 5.0),
            ("triple", AssetPart::Primary, 1.0),
        ]);
        let report = run(&loader, &NeverTimer, items(&[("oven", true), ("triple", false)]));

        assert_eq!(report.offsets(), vec![0.0, 2.0]);
        let oven = &report.placed[0];
        assert!(oven.is_composite());
        assert_eq!(oven.width, 2.0);
        assert_eq!(oven.secondary.as_ref().map(|s| s.handle.as_str()), Some("oven/Secondary"));
        assert!(!report.placed[1].is_composite());
    }

    #[test]
    fn test_failure_keeps_prefix_and_reports_index() {
        let mut loader = TableLoader::new(&[
            ("a", AssetPart::Primary, 1.0),
            ("b", AssetPart::Primary, 1.0),
            ("c", AssetPart::Primary, 1.0),
        ]);
        loader.failing = Some("b".into());
        let queue = items(&[("a", false), ("b", false), ("c", false)]);
        let failed_id = queue[1].item_id;
        let report = run(&loader, &NeverTimer, queue);

        assert_eq!(report.offsets(), vec![0.0]);
        assert_eq!(report.failed_index(), Some(1));
        match &report.failure {
            Some(LayoutError::AssetLoadFailure { item_id, source, .. }) => {
                assert_eq!(*item_id, failed_id);
                assert!(matches!(source, AssetError::Failed(_)));
            }
            other => panic!("unexpected failure: {other:?}"),
        }
        // Nothing after the failing item was requested.
        assert_eq!(*loader.requests.borrow(), vec![(0, AssetPart::Primary), (1, AssetPart::Primary)]);
    }

    #[test]
    fn test_missing_asset_is_reported() {
        let loader = TableLoader::new(&[("a", AssetPart::Primary, 1.0)]);
        let report = run(&loader, &NeverTimer, items(&[("a", false), ("ghost", false)]));
        assert_eq!(report.failed_index(), Some(1));
        assert!(matches!(
            report.failure,
            Some(LayoutError::AssetLoadFailure { source: AssetError::NotFound(_), .. })
        ));
    }

    #[test]
    fn test_stalled_load_times_out() {
        let mut loader = TableLoader::new(&[("a", AssetPart::Primary, 1.0)]);
        loader.stalled = Some("a".into());
        let report = run(&loader, &ExpiredTimer, items(&[("a", false)]));

        assert!(report.placed.is_empty());
        assert_eq!(report.failed_index(), Some(0));
        assert!(matches!(
            report.failure,
            Some(LayoutError::AssetLoadFailure { source: AssetError::TimedOut(5000), .. })
        ));
    }

    #[test]
    fn test_ready_load_beats_expired_timer() {
        let loader = TableLoader::new(&[("a", AssetPart::Primary, 1.5)]);
        let report = run(&loader, &ExpiredTimer, items(&[("a", false)]));
        assert!(report.is_complete());
        assert_eq!(report.placed[0].width, 1.5);
    }

    #[test]
    fn test_invalid_width_rejected() {
        for width in [-1.0, f64::NAN, f64::INFINITY] {
            let loader = TableLoader::new(&[("a", AssetPart::Primary, 1.0), ("bad", AssetPart::Primary, width)]);
            let report = run(&loader, &NeverTimer, items(&[("a", false), ("bad", false)]));
            assert_eq!(report.placed.len(), 1);
            assert!(matches!(
                report.failure,
                Some(LayoutError::AssetLoadFailure { index: 1, source: AssetError::InvalidSize(_), .. })
            ));
        }
    }

    #[test]
    fn test_requests_in_strict_order() {
        let loader = TableLoader::new(&[
            ("a", AssetPart::Primary, 1.0),
            ("oven", AssetPart::Primary, 1.0),
            ("oven", AssetPart::Secondary, 1.0),
        ]);
        run(&loader, &NeverTimer, items(&[("a", false), ("oven", true), ("a", false)]));
        assert_eq!(
            *loader.requests.borrow(),
            vec![
                (0, AssetPart::Primary),
                (1, AssetPart::Primary),
                (1, AssetPart::Secondary),
                (2, AssetPart::Primary),
            ]
        );
    }

    #[test]
    fn test_stream_yields_in_order() {
        let loader = TableLoader::new(&[("a", AssetPart::Primary, 2.0)]);
        let pipeline = PlacementPipeline::new(&loader, &NeverTimer, items(&[("a", false), ("a", false)]), 1.0, Duration::from_secs(1));
        let results: Vec<_> = pollster::block_on(pipeline.stream().collect::<Vec<_>>());
        let offsets: Vec<_> = results.into_iter().map(|r| r.map(|p| p.offset).ok()).collect();
        assert_eq!(offsets, vec![Some(1.0), Some(3.0)]);
    }

    #[test]
    fn test_default_model_order_and_origin() {
        let mut model = LayoutModel::default();
        let config = EditorConfig {
            placement_origin: PlacementOrigin::PolygonMinX,
            ..EditorConfig::default()
        };
        // Move the last item to the far left; it should be placed first.
        let last = model.items().last().map(|item| item.id()).unwrap();
        model.move_item(last, kurbo::Point::new(-0.5, 0.5)).unwrap();

        let loader = TableLoader::new(&[
            ("triple", AssetPart::Primary, 1.0),
            ("oven", AssetPart::Primary, 1.0),
            ("oven", AssetPart::Secondary, 1.0),
            ("default", AssetPart::Primary, 1.0),
        ]);
        let pipeline = PlacementPipeline::for_model(&model, &config, &loader, &NeverTimer);
        assert_eq!(pipeline.len(), 5);
        let report = pollster::block_on(pipeline.run());
        assert_eq!(report.placed[0].item_id, last);
        assert_eq!(report.offsets(), vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }
}
