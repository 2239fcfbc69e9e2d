use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, info, warn};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::marks::{AnnotationMarks, TextSplit};
use super::overlay::{Overlay, Selection, Tooltip, TOOLTIP_OFFSET_Y};
use super::price_blocks::{find_price_blocks, PriceBlock};
use super::span::{create_annotation, is_annotation_node};
use super::traversal::{text_fragments, TextFragment};
use crate::conversion::{format_amount, format_money, ConversionResolver};
use crate::document::{Document, MutationOrigin, NodeId, SharedDocument};
use crate::errors::DocumentError;
use crate::extraction::{display_symbol, MentionExtractor};
use crate::settings::{ConversionMode, ExtensionSettings, SettingsStore};

/// Timing of the controller.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Quiet period after the last relevant mutation before a rescan.
    pub debounce: Duration,
    /// Delay of the first scan after the watcher starts.
    pub initial_delay: Duration,
    /// Lifetime of a selection tooltip.
    pub tooltip_ttl: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(1500),
            initial_delay: Duration::from_millis(500),
            tooltip_ttl: Duration::from_secs(4),
        }
    }
}

/// What one scan did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub fragments_scanned: usize,
    pub mentions_found: usize,
    pub annotations_inserted: usize,
    pub price_annotations_inserted: usize,
    pub already_in_target: usize,
    pub rates_unavailable: usize,
    /// Nodes that changed while their conversion was awaited.
    pub conflicts: usize,
    pub errors: usize,
    pub marks_pruned: usize,
}

impl ScanReport {
    pub fn total_inserted(&self) -> usize {
        self.annotations_inserted + self.price_annotations_inserted
    }
}

/// Outcome of applying one annotation.
enum Applied {
    Inserted,
    Conflict,
}

/// Resets the scanning flag when a scan ends, however it ends.
struct ScanGuard<'a>(&'a AtomicBool);

impl<'a> ScanGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for ScanGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Annotation Controller.
///
/// Scans move Idle -> Scanning -> Mutating -> Idle. A scan requested while
/// another runs is dropped, not queued: the next relevant mutation triggers
/// a scan that picks up whatever is left. The document lock is only taken
/// in the synchronous steps, never across a conversion.
pub struct AnnotationController {
    pub(super) document: SharedDocument,
    resolver: Arc<ConversionResolver>,
    pub(super) settings: Arc<dyn SettingsStore>,
    overlay: Arc<dyn Overlay>,
    marks: Mutex<AnnotationMarks>,
    scanning: AtomicBool,
    scans_completed: AtomicUsize,
    pub(super) config: ControllerConfig,
}

impl AnnotationController {
    pub fn new(
        document: SharedDocument,
        resolver: Arc<ConversionResolver>,
        settings: Arc<dyn SettingsStore>,
        overlay: Arc<dyn Overlay>,
    ) -> Self {
        Self {
            document,
            resolver,
            settings,
            overlay,
            marks: Mutex::new(AnnotationMarks::new()),
            scanning: AtomicBool::new(false),
            scans_completed: AtomicUsize::new(0),
            config: ControllerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ControllerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn document(&self) -> &SharedDocument {
        &self.document
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning.load(Ordering::Acquire)
    }

    pub fn scans_completed(&self) -> usize {
        self.scans_completed.load(Ordering::Relaxed)
    }

    pub fn marked_count(&self) -> usize {
        self.lock_marks().len()
    }

    pub(super) fn lock_document(&self) -> MutexGuard<'_, Document> {
        self.document.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_marks(&self) -> MutexGuard<'_, AnnotationMarks> {
        self.marks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_marked(&self, element: NodeId) -> bool {
        self.lock_marks().is_marked(element)
    }

    // ------------------------------------------------------------------
    // Scanning
    // ------------------------------------------------------------------

    /// Annotate every eligible mention in the document body.
    ///
    /// Returns `None` when the scan did not run: annotation is disabled, the
    /// mode is not auto, or another scan is in progress.
    pub async fn scan(&self) -> Option<ScanReport> {
        let settings = self.settings.get();
        if !settings.annotates() {
            debug!("Annotation is off (mode {:?}); scan skipped", settings.mode);
            return None;
        }
        let Some(_guard) = ScanGuard::acquire(&self.scanning) else {
            debug!("Scan already in progress; trigger dropped");
            return None;
        };

        let mut report = ScanReport::default();
        let fragments = self.collect_fragments(&mut report);
        report.fragments_scanned = fragments.len();

        let extractor = MentionExtractor::explicit();
        for fragment in fragments {
            // An earlier fragment of this scan may have annotated the parent.
            if self.is_marked(fragment.parent) {
                continue;
            }
            let Some(mention) = extractor.first(&fragment.text) else {
                continue;
            };
            report.mentions_found += 1;

            if mention.currency_code == settings.target_currency {
                report.already_in_target += 1;
                continue;
            }

            let Some(conversion) = self
                .resolver
                .convert(
                    mention.amount,
                    &mention.currency_code,
                    &settings.target_currency,
                    settings.rate_offset_percent,
                )
                .await
            else {
                report.rates_unavailable += 1;
                continue;
            };

            let label = format_money(
                conversion.target_amount,
                &settings.target_currency,
                settings.decimal_places,
            );
            match self.annotate_fragment(&fragment, mention.end_offset(), &label) {
                Ok(Applied::Inserted) => report.annotations_inserted += 1,
                Ok(Applied::Conflict) => report.conflicts += 1,
                Err(e) => {
                    warn!("Skipping fragment {}: {}", fragment.node, e);
                    report.errors += 1;
                }
            }
        }

        self.annotate_price_blocks(&settings, &mut report).await;

        self.scans_completed.fetch_add(1, Ordering::Relaxed);
        if report.total_inserted() > 0 {
            info!(
                "Scan inserted {} annotations ({} fragments, {} unavailable, {} conflicts)",
                report.total_inserted(),
                report.fragments_scanned,
                report.rates_unavailable,
                report.conflicts
            );
        } else {
            debug!("Scan finished without changes: {:?}", report);
        }
        Some(report)
    }

    fn collect_fragments(&self, report: &mut ScanReport) -> Vec<TextFragment> {
        let document = self.lock_document();
        let mut marks = self.lock_marks();
        report.marks_pruned = marks.prune(&document);
        text_fragments(&document, document.body(), &marks)
    }

    /// Split the fragment after the mention and insert the annotation there.
    /// The page's node keeps the text up to the mention; the rest moves to a
    /// new node after the annotation.
    fn annotate_fragment(
        &self,
        fragment: &TextFragment,
        split_at: usize,
        label: &str,
    ) -> Result<Applied, DocumentError> {
        let mut document = self.lock_document();
        let mut marks = self.lock_marks();

        let unchanged = document.is_attached(fragment.node)
            && document.parent(fragment.node) == Some(fragment.parent)
            && document.text(fragment.node) == Some(fragment.text.as_str());
        if !unchanged || marks.is_marked(fragment.parent) {
            debug!(
                "Text node {} changed while converting; left alone",
                fragment.node
            );
            return Ok(Applied::Conflict);
        }

        let font = document.computed_font(fragment.parent);
        let (before, after) = fragment.text.split_at(split_at);
        let (span, tail) = document.mutate_as(MutationOrigin::Annotator, |doc| {
            let span = create_annotation(doc, label, &font)?;
            let next = doc.next_sibling(fragment.node);
            doc.set_text(fragment.node, before)?;
            doc.insert_before(fragment.parent, span, next)?;
            let tail = if after.is_empty() {
                None
            } else {
                let tail = doc.create_text(after);
                doc.insert_before(fragment.parent, tail, next)?;
                Some(tail)
            };
            Ok((span, tail))
        })?;

        marks.mark(fragment.parent);
        marks.record_split(
            span,
            TextSplit {
                head: fragment.node,
                tail,
            },
        );
        Ok(Applied::Inserted)
    }

    /// Secondary pass over split price widgets.
    async fn annotate_price_blocks(&self, settings: &ExtensionSettings, report: &mut ScanReport) {
        let blocks = {
            let document = self.lock_document();
            let marks = self.lock_marks();
            find_price_blocks(&document, document.body(), &marks)
        };

        for block in blocks {
            if block.currency == settings.target_currency {
                report.already_in_target += 1;
                continue;
            }
            let Some(conversion) = self
                .resolver
                .convert(
                    block.amount,
                    block.currency,
                    &settings.target_currency,
                    settings.rate_offset_percent,
                )
                .await
            else {
                report.rates_unavailable += 1;
                continue;
            };

            let label = format_money(
                conversion.target_amount,
                &settings.target_currency,
                settings.decimal_places,
            );
            match self.annotate_container(&block, &label) {
                Ok(Applied::Inserted) => report.price_annotations_inserted += 1,
                Ok(Applied::Conflict) => report.conflicts += 1,
                Err(e) => {
                    warn!("Skipping price container {}: {}", block.container, e);
                    report.errors += 1;
                }
            }
        }
    }

    fn annotate_container(
        &self,
        block: &PriceBlock,
        label: &str,
    ) -> Result<Applied, DocumentError> {
        let mut document = self.lock_document();
        let mut marks = self.lock_marks();

        let already_annotated = document
            .descendants(block.container)
            .into_iter()
            .any(|d| is_annotation_node(&document, d));
        if !document.is_attached(block.container)
            || marks.is_marked(block.container)
            || already_annotated
        {
            return Ok(Applied::Conflict);
        }

        let font = document.computed_font(block.container);
        document.mutate_as(MutationOrigin::Annotator, |doc| {
            let span = create_annotation(doc, label, &font)?;
            doc.append_child(block.container, span)
        })?;

        marks.mark(block.container);
        Ok(Applied::Inserted)
    }

    // ------------------------------------------------------------------
    // Stripping
    // ------------------------------------------------------------------

    /// Remove every annotation, rejoin the text nodes split to insert it and
    /// forget the affected marks. Page nodes keep their ids; nodes the
    /// annotator did not create are never merged. Returns the number of
    /// annotations removed.
    pub fn strip(&self) -> usize {
        let mut document = self.lock_document();
        let mut marks = self.lock_marks();

        let root = document.root();
        let annotations: Vec<(NodeId, Option<TextSplit>)> = document
            .find_elements(root, super::span::is_annotation)
            .into_iter()
            .map(|annotation| (annotation, marks.take_split(annotation)))
            .collect();
        if annotations.is_empty() {
            return 0;
        }

        let result = document.mutate_as(MutationOrigin::Annotator, |doc| {
            let mut parents = Vec::new();
            let mut removed = 0;
            for (annotation, split) in annotations {
                // Nested annotations go away with their ancestor.
                if !doc.contains(annotation) {
                    continue;
                }
                if let Some(parent) = doc.parent(annotation) {
                    if !parents.contains(&parent) {
                        parents.push(parent);
                    }
                }
                doc.remove(annotation)?;
                removed += 1;
                if let Some(split) = split {
                    rejoin(doc, split)?;
                }
            }
            Ok((removed, parents))
        });

        match result {
            Ok((removed, parents)) => {
                for parent in parents {
                    marks.unmark(parent);
                }
                info!("Removed {} annotations", removed);
                removed
            }
            Err(e) => {
                warn!("Stripping annotations failed: {}", e);
                0
            }
        }
    }

    // ------------------------------------------------------------------
    // Settings and selection
    // ------------------------------------------------------------------

    /// React to new settings: auto scans, manual and selection strip.
    /// Stripping happens even while the extension is disabled.
    pub async fn apply_settings(&self, settings: &ExtensionSettings) {
        match settings.mode {
            ConversionMode::Manual | ConversionMode::Selection => {
                self.strip();
            }
            ConversionMode::Auto if settings.extension_enabled => {
                self.scan().await;
            }
            ConversionMode::Auto => {
                debug!("Extension disabled; auto scan skipped");
            }
        }
    }

    /// Convert the first mention in a selection and show it in a tooltip
    /// that dismisses itself. Never touches the document.
    pub async fn handle_selection(&self, selection: &Selection) -> Option<Tooltip> {
        let settings = self.settings.get();
        if !settings.extension_enabled || settings.mode != ConversionMode::Selection {
            return None;
        }
        let text = selection.text.trim();
        if text.is_empty() {
            return None;
        }

        let mention =
            MentionExtractor::with_implied_currency(&settings.base_currency).first(text)?;
        if mention.currency_code == settings.target_currency {
            return None;
        }

        let conversion = self
            .resolver
            .convert(
                mention.amount,
                &mention.currency_code,
                &settings.target_currency,
                settings.rate_offset_percent,
            )
            .await?;

        let tooltip = Tooltip {
            id: Uuid::new_v4(),
            source_label: tooltip_label(
                conversion.source_amount,
                &conversion.source_currency,
                settings.decimal_places,
            ),
            target_label: tooltip_label(
                conversion.target_amount,
                &conversion.target_currency,
                settings.decimal_places,
            ),
            source_amount: conversion.source_amount,
            target_amount: conversion.target_amount,
            x: selection.x,
            y: selection.y + TOOLTIP_OFFSET_Y,
        };
        self.overlay.show(&tooltip);

        let overlay = Arc::clone(&self.overlay);
        let ttl = self.config.tooltip_ttl;
        let id = tooltip.id;
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            overlay.dismiss(id);
        });

        Some(tooltip)
    }
}

/// Move the tail of a split back into its head, when both are still
/// siblings. A tail the page has since moved or replaced is left alone.
fn rejoin(doc: &mut Document, split: TextSplit) -> Result<(), DocumentError> {
    let Some(tail) = split.tail else {
        return Ok(());
    };
    if doc.parent(tail).is_none() || doc.parent(tail) != doc.parent(split.head) {
        return Ok(());
    }
    let (Some(head_text), Some(tail_text)) = (doc.text(split.head), doc.text(tail)) else {
        return Ok(());
    };
    let joined = format!("{}{}", head_text, tail_text);
    doc.set_text(split.head, &joined)?;
    doc.remove(tail)
}

/// `€ 1,234.50 EUR`
fn tooltip_label(amount: Decimal, currency: &str, decimal_places: u32) -> String {
    format!(
        "{} {} {}",
        display_symbol(currency),
        format_amount(amount, decimal_places),
        currency
    )
}
