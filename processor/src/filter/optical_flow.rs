use live_filters_common::config::OpticalFlowParams;
use live_filters_common::frame::FramePair;
use opencv::core::{self, Mat, Point, Point2f, Scalar, Size, TermCriteria, Vector};
use opencv::prelude::*;
use opencv::{imgproc, video};
use rand::Rng;
use tracing::debug;

use super::{to_gray, FrameFilter};
use crate::error::FilterError;

const TRAIL_THICKNESS: i32 = 2;
const MARKER_RADIUS: i32 = 5;
const HARRIS_K: f64 = 0.04;
const MIN_EIG_THRESHOLD: f64 = 1e-4;

/// State carried between frames while tracking.
struct TrackState {
    /// Accumulated trails, same size and type as the input frames.
    mask: Mat,
    /// One color per point slot, fixed for the lifetime of the track.
    colors: Vec<Scalar>,
    points: Vector<Point2f>,
    frame_size: Size,
}

/// Sparse Lucas-Kanade tracking of Shi-Tomasi corners.
///
/// The first call after construction or `reset` seeds corners from the
/// previous frame and returns the current frame untouched. Each later call
/// tracks the points into the current frame, extends their trails on a
/// persistent mask and marks their new positions. When every point has been
/// lost the filter seeds again from the current frame, keeping the trails.
pub struct OpticalFlow {
    params: OpticalFlowParams,
    track: Option<TrackState>,
}

impl OpticalFlow {
    pub fn new(params: OpticalFlowParams) -> Self {
        Self {
            params,
            track: None,
        }
    }

    /// Number of points currently tracked.
    pub fn tracked_points(&self) -> usize {
        self.track.as_ref().map_or(0, |t| t.points.len())
    }

    fn start_track(&mut self, frames: &FramePair<'_>) -> Result<Mat, FilterError> {
        let frame_size = frames.curr.size()?;
        let mask = Mat::zeros_size(frame_size, frames.curr.typ())?.to_mat()?;
        let points = detect_features(&self.params, &to_gray(frames.prev)?)?;
        debug!(
            points = points.len(),
            width = frame_size.width,
            height = frame_size.height,
            "optical flow: seeded tracking points"
        );
        self.track = Some(TrackState {
            mask,
            colors: random_colors(self.params.max_corners.max(1) as usize),
            points,
            frame_size,
        });
        Ok(frames.curr.try_clone()?)
    }
}

impl FrameFilter for OpticalFlow {
    fn name(&self) -> &str {
        "optical flow"
    }

    fn apply(&mut self, frames: &FramePair<'_>) -> Result<Mat, FilterError> {
        if frames.curr.empty() || frames.prev.empty() {
            return Err(FilterError::EmptyFrame);
        }
        let frame_size = frames.curr.size()?;
        let prev_size = frames.prev.size()?;

        // Taken out for the duration of the call; an error mid-way restarts tracking.
        let mut track = match self.track.take() {
            Some(track) if track.frame_size == frame_size && prev_size == frame_size => track,
            _ => return self.start_track(frames),
        };

        let curr_gray = to_gray(frames.curr)?;
        if track.points.is_empty() {
            track.points = detect_features(&self.params, &curr_gray)?;
            debug!(points = track.points.len(), "optical flow: all points lost, reseeding");
            let mut result = Mat::default();
            core::add_def(frames.curr, &track.mask, &mut result)?;
            self.track = Some(track);
            return Ok(result);
        }

        let prev_gray = to_gray(frames.prev)?;
        let mut next_points = Vector::<Point2f>::new();
        let mut status = Vector::<u8>::new();
        let mut err = Vector::<f32>::new();
        video::calc_optical_flow_pyr_lk(
            &prev_gray,
            &curr_gray,
            &track.points,
            &mut next_points,
            &mut status,
            &mut err,
            Size::new(self.params.win_size, self.params.win_size),
            self.params.max_level,
            criteria(&self.params)?,
            0,
            MIN_EIG_THRESHOLD,
        )?;

        let mut marked = frames.curr.try_clone()?;
        let mut kept = Vector::<Point2f>::new();
        let tracked = next_points
            .iter()
            .zip(track.points.iter())
            .zip(status.iter())
            .filter(|(_, st)| *st == 1)
            .map(|(pair, _)| pair);
        for (i, (new, old)) in tracked.enumerate() {
            let color = track.colors[i % track.colors.len()];
            imgproc::line(
                &mut track.mask,
                to_pixel(new),
                to_pixel(old),
                color,
                TRAIL_THICKNESS,
                imgproc::LINE_8,
                0,
            )?;
            imgproc::circle(
                &mut marked,
                to_pixel(new),
                MARKER_RADIUS,
                color,
                imgproc::FILLED,
                imgproc::LINE_8,
                0,
            )?;
            kept.push(new);
        }
        if kept.len() < track.points.len() {
            debug!(
                before = track.points.len(),
                after = kept.len(),
                "optical flow: dropped lost points"
            );
        }
        track.points = kept;

        let mut result = Mat::default();
        core::add_def(&marked, &track.mask, &mut result)?;
        self.track = Some(track);
        Ok(result)
    }

    fn reset(&mut self) {
        self.track = None;
    }
}

fn detect_features(params: &OpticalFlowParams, gray: &Mat) -> Result<Vector<Point2f>, FilterError> {
    let mut corners = Vector::<Point2f>::new();
    imgproc::good_features_to_track(
        gray,
        &mut corners,
        params.max_corners,
        params.quality_level,
        params.min_distance,
        &core::no_array(),
        params.block_size,
        false,
        HARRIS_K,
    )?;
    Ok(corners)
}

fn criteria(params: &OpticalFlowParams) -> Result<TermCriteria, FilterError> {
    let typ = core::TermCriteria_Type::COUNT as i32 | core::TermCriteria_Type::EPS as i32;
    Ok(TermCriteria::new(typ, params.max_iterations, params.epsilon)?)
}

fn to_pixel(p: Point2f) -> Point {
    Point::new(p.x as i32, p.y as i32)
}

fn random_colors(n: usize) -> Vec<Scalar> {
    let mut rng = rand::rng();
    (0..n)
        .map(|_| {
            Scalar::new(
                f64::from(rng.random_range(0..255u8)),
                f64::from(rng.random_range(0..255u8)),
                f64::from(rng.random_range(0..255u8)),
                0.0,
            )
        })
        .collect()
}
