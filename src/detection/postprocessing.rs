// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Decoding of YOLOv8 detection heads and per-class NMS

use anyhow::{bail, Result};
use ndarray::{ArrayViewD, Ix3};
use std::collections::HashMap;

use super::preprocessing::Letterbox;
use crate::damage::BoundingBox;

/// A decoded box before class-name mapping
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub class_index: usize,
    pub confidence: f32,
    pub bbox: BoundingBox,
}

#[derive(Debug, Clone, Copy)]
pub struct PostprocessParams {
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    pub max_detections: usize,
    /// Classes the model was exported with; the head carries `4 + num_classes` attributes
    pub num_classes: usize,
}

/// Decode a `[1, 4 + nc, N]` head (or its `[1, N, 4 + nc]` transpose).
///
/// Boxes are `cx, cy, w, h` in letterboxed model space; the result is in
/// original image coordinates, sorted by confidence descending.
pub fn decode_output(
    output: ArrayViewD<f32>,
    letterbox: &Letterbox,
    params: &PostprocessParams,
) -> Result<Vec<Candidate>> {
    if output.ndim() != 3 || output.shape()[0] != 1 {
        bail!("Unexpected detection output shape: {:?}", output.shape());
    }
    let mut head = output.into_dimensionality::<Ix3>()?;

    let num_classes = params.num_classes;
    let attributes = 4 + num_classes;
    if num_classes == 0 {
        bail!("Detection output has no class scores: {:?}", head.shape());
    }
    if head.shape()[1] != attributes {
        if head.shape()[2] != attributes {
            bail!(
                "Detection output {:?} does not match {} classes",
                head.shape(),
                num_classes
            );
        }
        head.swap_axes(1, 2);
    }
    let num_boxes = head.shape()[2];

    let mut candidates = Vec::new();
    for i in 0..num_boxes {
        let (class_index, confidence) = (0..num_classes)
            .map(|c| (c, head[[0, 4 + c, i]]))
            .fold((0, f32::MIN), |best, cur| if cur.1 > best.1 { cur } else { best });

        if confidence < params.confidence_threshold {
            continue;
        }

        let cx = head[[0, 0, i]];
        let cy = head[[0, 1, i]];
        let w = head[[0, 2, i]];
        let h = head[[0, 3, i]];

        let bbox = BoundingBox::new(
            letterbox.to_original_x(cx - w / 2.0),
            letterbox.to_original_y(cy - h / 2.0),
            letterbox.to_original_x(cx + w / 2.0),
            letterbox.to_original_y(cy + h / 2.0),
        );

        if bbox.area() <= 0.0 {
            continue;
        }

        candidates.push(Candidate {
            class_index,
            confidence,
            bbox,
        });
    }

    let mut kept = nms(candidates, params.iou_threshold);
    kept.truncate(params.max_detections);
    Ok(kept)
}

/// Greedy non-maximum suppression, applied within each class
pub fn nms(candidates: Vec<Candidate>, iou_threshold: f32) -> Vec<Candidate> {
    let mut by_class: HashMap<usize, Vec<Candidate>> = HashMap::new();
    for candidate in candidates {
        by_class.entry(candidate.class_index).or_default().push(candidate);
    }

    let mut kept = Vec::new();
    for (_, mut group) in by_class {
        group.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        let mut suppressed = vec![false; group.len()];
        for i in 0..group.len() {
            if suppressed[i] {
                continue;
            }
            for j in (i + 1)..group.len() {
                if !suppressed[j] && group[i].bbox.iou(&group[j].bbox) > iou_threshold {
                    suppressed[j] = true;
                }
            }
            kept.push(group[i].clone());
        }
    }

    kept.sort_by(|a, b| {
        b.confidence
            .total_cmp(&a.confidence)
            .then(a.class_index.cmp(&b.class_index))
    });
    kept
}
