//! CPU-mode reference module: a scrolling color gradient.
//!
//! With `Pipelined` on, the next frame is filled on a background thread while the current one is
//! uploaded. The buffer travels to the worker with [`CpuSlots::take`] and comes back with
//! [`CpuSlots::restore`], so the worker is the only writer of that slot until it is returned.

use crate::buffers::pixel::{PixelBuffer, encode_pixel};
use crate::buffers::slots::{CpuSlots, SLOT_COUNT, SlotState};
use crate::execute::mode::{ExecuteMode, GeneralSettings};
use crate::format::request::OutputFormat;
use crate::foundation::core::PixelType;
use crate::operator::api::{
    CookInputs, CookOutput, InfoChannel, InfoTableEntries, InfoTableSize, NodeInfo,
    OperatorFactory, TextureOperator,
};
use crate::operator::params::ParameterManager;
use rayon::prelude::*;
use std::sync::mpsc;
use std::thread::JoinHandle;

/// Fill `buffer` with the gradient at `phase` (wrapped to `0..1`).
///
/// Red ramps left to right and scrolls with `phase`, green ramps top to bottom, blue is the
/// complement of red, alpha is opaque.
pub fn fill_gradient(buffer: &mut PixelBuffer, phase: f64) {
    let (w, h, pixel_type) = (buffer.width(), buffer.height(), buffer.pixel_type());
    let row_bytes = buffer.row_bytes();
    if row_bytes == 0 {
        return;
    }
    let bpp = pixel_type.bytes_per_pixel();
    let phase = phase.rem_euclid(1.0) as f32;
    let x_den = w.saturating_sub(1).max(1) as f32;
    let y_den = h.saturating_sub(1).max(1) as f32;

    buffer
        .bytes_mut()
        .par_chunks_mut(row_bytes)
        .enumerate()
        .for_each(|(y, row)| {
            let g = y as f32 / y_den;
            for (x, px) in row.chunks_exact_mut(bpp).enumerate() {
                let t = x as f32 / x_den + phase;
                let r = if t > 1.0 { t - 1.0 } else { t };
                encode_pixel(pixel_type, [r, g, 1.0 - r, 1.0], px);
            }
        });
}

struct FillJob {
    buffer: PixelBuffer,
    phase: f64,
}

struct Worker {
    jobs: Option<mpsc::Sender<FillJob>>,
    done: mpsc::Receiver<PixelBuffer>,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    fn spawn(name: &str) -> std::io::Result<Self> {
        let (jobs, job_rx) = mpsc::channel::<FillJob>();
        let (done_tx, done) = mpsc::channel();
        let handle = std::thread::Builder::new()
            .name(format!("texop-gradient {name}"))
            .spawn(move || {
                for mut job in job_rx {
                    fill_gradient(&mut job.buffer, job.phase);
                    if done_tx.send(job.buffer).is_err() {
                        break;
                    }
                }
            })?;
        Ok(Self {
            jobs: Some(jobs),
            done,
            handle: Some(handle),
        })
    }

    fn submit(&self, job: FillJob) -> Result<(), PixelBuffer> {
        match &self.jobs {
            Some(tx) => tx.send(job).map_err(|e| e.0.buffer),
            None => Err(job.buffer),
        }
    }

    /// Stop the thread and hand back every buffer it finished but nobody collected.
    fn shutdown(mut self) -> Vec<PixelBuffer> {
        self.stop();
        self.done.try_iter().collect()
    }

    fn stop(&mut self) {
        // Closing the job channel ends the worker loop.
        self.jobs = None;
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            tracing::warn!("gradient fill worker panicked");
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Scrolling gradient written into CPU slots.
///
/// Parameters: `Speed` (cycles per second), `Pipelined` (background fill), `Reset` (pulse,
/// rewinds the phase).
pub struct GradientOperator {
    path: String,
    pixel_type: PixelType,
    phase: f64,
    last_delta: f64,
    worker: Option<Worker>,
    in_flight: bool,
    ready: Option<usize>,
    uploads: u64,
    background_fills: u64,
    slot_view: [(SlotState, bool, u64); SLOT_COUNT],
    error: Option<String>,
    warning: Option<String>,
}

impl GradientOperator {
    /// Instance for `info` writing `pixel_type` slots.
    pub fn new(info: &NodeInfo, pixel_type: PixelType) -> Self {
        Self {
            path: info.op_path.clone(),
            pixel_type,
            phase: 0.0,
            last_delta: 0.0,
            worker: None,
            in_flight: false,
            ready: None,
            uploads: 0,
            background_fills: 0,
            slot_view: [(SlotState::ValidForReuse, false, 0); SLOT_COUNT],
            error: None,
            warning: None,
        }
    }

    /// Current phase in `0..1`.
    pub fn phase(&self) -> f64 {
        self.phase
    }

    fn collect_finished(&mut self, slots: &mut CpuSlots) {
        let Some(worker) = &self.worker else {
            return;
        };
        let disconnected = loop {
            match worker.done.try_recv() {
                Ok(buffer) => {
                    self.in_flight = false;
                    match slots.restore(buffer) {
                        Ok(index) => {
                            self.ready = Some(index);
                            self.background_fills += 1;
                        }
                        Err(stale) => {
                            tracing::debug!(id = ?stale.id(), "dropping stale background buffer");
                        }
                    }
                }
                Err(mpsc::TryRecvError::Empty) => break false,
                Err(mpsc::TryRecvError::Disconnected) => break true,
            }
        };
        if disconnected {
            self.stop_worker(slots);
            self.warning = Some("background fill worker stopped".to_string());
        }
    }

    /// Join the worker and put every buffer it still holds back into its slot.
    ///
    /// A buffer lost with the thread is replaced by a fresh allocation.
    fn stop_worker(&mut self, slots: &mut CpuSlots) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        for buffer in worker.shutdown() {
            if let Err(stale) = slots.restore(buffer) {
                tracing::debug!(id = ?stale.id(), "dropping stale background buffer");
            }
        }
        self.in_flight = false;
        for index in 0..SLOT_COUNT {
            if slots.reclaim(index) {
                tracing::warn!(slot = index, "background buffer lost, slot reallocated");
            }
        }
    }

    fn schedule_next(&mut self, slots: &mut CpuSlots, uploading: usize) {
        if self.in_flight {
            return;
        }
        if self.worker.is_none() {
            match Worker::spawn(&self.path) {
                Ok(w) => self.worker = Some(w),
                Err(e) => {
                    self.warning = Some(format!("background fill unavailable: {e}"));
                    return;
                }
            }
        }
        let Some(index) = (0..SLOT_COUNT).find(|&i| i != uploading && slots.is_resident(i)) else {
            return;
        };
        let Some(buffer) = slots.take(index) else {
            return;
        };
        let job = FillJob {
            buffer,
            phase: self.phase + self.last_delta,
        };
        let submitted = match &self.worker {
            Some(worker) => worker.submit(job),
            None => Err(job.buffer),
        };
        match submitted {
            Ok(()) => self.in_flight = true,
            Err(buffer) => {
                if let Err(stale) = slots.restore(buffer) {
                    tracing::debug!(id = ?stale.id(), "dropping stale background buffer");
                }
                self.stop_worker(slots);
                self.warning = Some("background fill worker stopped".to_string());
            }
        }
    }

    fn snapshot(&mut self, slots: &CpuSlots) {
        for (i, view) in self.slot_view.iter_mut().enumerate() {
            *view = (
                slots.state(i).unwrap_or(SlotState::Retired),
                slots.is_resident(i),
                slots.id(i).map_or(0, |id| id.get()),
            );
        }
    }
}

impl TextureOperator for GradientOperator {
    fn general_settings(&mut self, settings: &mut GeneralSettings) {
        settings.cook_every_frame = true;
        settings.execute_mode = ExecuteMode::CpuWriteOnly;
        settings.pixel_type = self.pixel_type;
    }

    fn output_format(&mut self, node_default: &OutputFormat) -> Option<OutputFormat> {
        if !self.pixel_type.is_float() {
            return None;
        }
        let mut req = node_default.clone();
        req.bits_per_channel = 32;
        req.float_precision = true;
        Some(req)
    }

    fn execute(&mut self, output: &mut CookOutput<'_>, inputs: &CookInputs<'_>) {
        self.error = None;
        self.warning = None;
        let Some(slots) = output.cpu_slots() else {
            self.error = Some("gradient needs a CPU execute mode".to_string());
            return;
        };

        let params = inputs.params();
        let speed = params.float("Speed").unwrap_or(0.25);
        let pipelined = params.toggle("Pipelined").unwrap_or(true);
        self.last_delta = speed * inputs.delta_secs();
        self.phase = (self.phase + self.last_delta).rem_euclid(1.0);

        self.collect_finished(slots);

        let upload = match self.ready.take().filter(|&i| slots.is_resident(i)) {
            Some(index) => index,
            None => {
                let Some(index) = (0..SLOT_COUNT).find(|&i| slots.is_resident(i)) else {
                    self.warning = Some("no resident slot this cook".to_string());
                    self.snapshot(slots);
                    return;
                };
                if let Some(buffer) = slots.slot_mut(index) {
                    fill_gradient(buffer, self.phase);
                }
                index
            }
        };
        // Upload indices are always 0..SLOT_COUNT.
        slots.set_upload_slot(upload as i32);
        self.uploads += 1;

        if pipelined {
            self.schedule_next(slots, upload);
        } else {
            self.stop_worker(slots);
        }
        self.snapshot(slots);
    }

    fn info_channel_count(&mut self) -> usize {
        3
    }

    fn info_channel(&mut self, index: usize) -> Option<InfoChannel> {
        match index {
            0 => Some(InfoChannel::new("phase", self.phase as f32)),
            1 => Some(InfoChannel::new("uploads", self.uploads as f32)),
            2 => Some(InfoChannel::new("background_fills", self.background_fills as f32)),
            _ => None,
        }
    }

    fn info_table_size(&mut self) -> Option<InfoTableSize> {
        Some(InfoTableSize::by_rows(SLOT_COUNT, 3))
    }

    fn info_table_entries(&mut self, index: usize, entries: &mut InfoTableEntries) {
        let Some(&(state, resident, id)) = self.slot_view.get(index) else {
            return;
        };
        let state = match (state, resident) {
            (SlotState::Retired, _) => "retired",
            (SlotState::ValidForReuse, true) => "valid",
            (SlotState::ValidForReuse, false) => "filling",
        };
        entries.set(0, format!("slot{index}"));
        entries.set(1, state);
        entries.set(2, id.to_string());
    }

    fn warning(&mut self) -> Option<String> {
        self.warning.clone()
    }

    fn error(&mut self) -> Option<String> {
        self.error.clone()
    }

    fn info_popup(&mut self) -> Option<String> {
        Some(format!(
            "gradient {:?}, {} uploads, {} filled in background",
            self.pixel_type, self.uploads, self.background_fills
        ))
    }

    fn setup_parameters(&mut self, manager: &mut ParameterManager<'_>) {
        manager.set_page("Gradient");
        manager.append_float("Speed", "Speed", 0.25, -10.0, 10.0);
        manager.append_toggle("Pipelined", "Pipelined", true);
        manager.append_pulse("Reset", "Reset");
    }

    fn pulse_pressed(&mut self, name: &str) {
        if name == "Reset" {
            self.phase = 0.0;
        }
    }
}

/// Factory for [`GradientOperator`].
#[derive(Clone, Copy, Debug, Default)]
pub struct GradientFactory {
    /// Slot pixel layout for every instance.
    pub pixel_type: PixelType,
}

impl OperatorFactory for GradientFactory {
    fn create(&self, info: &NodeInfo) -> Option<Box<dyn TextureOperator>> {
        Some(Box::new(GradientOperator::new(info, self.pixel_type)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/operators/gradient.rs"]
mod tests;
