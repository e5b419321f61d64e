use super::*;
use crate::format::negotiate::negotiate;
use crate::format::caps::HostCaps;
use crate::operator::api::OutputSurface;
use crate::operator::params::ParameterStore;
use crate::foundation::core::FrameIndex;
use crate::buffers::slots::NO_UPLOAD;

#[test]
fn gradient_corners() {
    let mut buf = PixelBuffer::new(5, 3, PixelType::Rgba8Fixed);
    fill_gradient(&mut buf, 0.0);
    assert_eq!(buf.pixel(0, 0), Some([0.0, 0.0, 1.0, 1.0]));
    assert_eq!(buf.pixel(4, 2), Some([1.0, 1.0, 0.0, 1.0]));

    let mut bgra = PixelBuffer::new(5, 3, PixelType::Bgra8Fixed);
    fill_gradient(&mut bgra, 0.0);
    assert_eq!(&bgra.bytes()[..4], &[255, 0, 0, 255]);
}

#[test]
fn gradient_phase_wraps() {
    let mut a = PixelBuffer::new(4, 1, PixelType::Rgba32Float);
    let mut b = PixelBuffer::new(4, 1, PixelType::Rgba32Float);
    fill_gradient(&mut a, 0.25);
    fill_gradient(&mut b, 1.25);
    assert_eq!(a.bytes(), b.bytes());
}

fn cook_once(op: &mut GradientOperator, slots: &mut CpuSlots, params: &ParameterStore, dt: f64) {
    let resolved = negotiate(
        None,
        &OutputFormat::new(slots.width(), slots.height()),
        ExecuteMode::CpuWriteOnly,
        &HostCaps::default(),
    )
    .unwrap();
    let inputs = CookInputs {
        frame: FrameIndex(0),
        time_secs: 0.0,
        delta_secs: dt,
        inputs: &[],
        params,
    };
    slots.begin_cook(slots.width(), slots.height(), slots.pixel_type());
    let mut out = CookOutput::new(&resolved, ExecuteMode::CpuWriteOnly, OutputSurface::Cpu(slots));
    op.execute(&mut out, &inputs);
}

#[test]
fn synchronous_fill_uploads_a_filled_slot() {
    let info = NodeInfo::new("/test/gradient", 1);
    let mut op = GradientOperator::new(&info, PixelType::Rgba8Fixed);
    let mut params = ParameterStore::default();
    op.setup_parameters(&mut ParameterManager::new(&mut params));
    params
        .set("Pipelined", crate::operator::params::ParameterValue::Toggle(false))
        .unwrap();

    let mut slots = CpuSlots::new(4, 4, PixelType::Rgba8Fixed);
    cook_once(&mut op, &mut slots, &params, 0.0);
    let chosen = slots.upload_slot();
    assert_ne!(chosen, NO_UPLOAD);
    let filled = slots.slot(chosen as usize).unwrap();
    assert_eq!(filled.pixel(0, 0), Some([0.0, 0.0, 1.0, 1.0]));
    assert!((0..SLOT_COUNT).all(|i| slots.is_resident(i)));
}

#[test]
fn pipelined_fill_checks_out_one_other_slot() {
    let info = NodeInfo::new("/test/gradient", 2);
    let mut op = GradientOperator::new(&info, PixelType::Bgra8Fixed);
    let mut params = ParameterStore::default();
    op.setup_parameters(&mut ParameterManager::new(&mut params));

    let mut slots = CpuSlots::new(8, 8, PixelType::Bgra8Fixed);
    cook_once(&mut op, &mut slots, &params, 0.1);
    let chosen = slots.upload_slot() as usize;
    let lent: Vec<usize> = (0..SLOT_COUNT).filter(|&i| !slots.is_resident(i)).collect();
    assert_eq!(lent.len(), 1);
    assert_ne!(lent[0], chosen);
}

#[test]
fn reset_pulse_rewinds_phase() {
    let info = NodeInfo::new("/test/gradient", 3);
    let mut op = GradientOperator::new(&info, PixelType::Rgba8Fixed);
    let mut params = ParameterStore::default();
    op.setup_parameters(&mut ParameterManager::new(&mut params));
    params
        .set("Pipelined", crate::operator::params::ParameterValue::Toggle(false))
        .unwrap();
    let mut slots = CpuSlots::new(2, 2, PixelType::Rgba8Fixed);
    cook_once(&mut op, &mut slots, &params, 1.0);
    assert!(op.phase() > 0.0);
    op.pulse_pressed("Reset");
    assert_eq!(op.phase(), 0.0);
}

#[test]
fn float_slots_request_float_precision() {
    let info = NodeInfo::new("/test/gradient", 4);
    let mut op = GradientOperator::new(&info, PixelType::Rgba32Float);
    let req = op.output_format(&OutputFormat::new(16, 16)).unwrap();
    assert!(req.float_precision);
    assert_eq!(req.bits_per_channel, 32);
    let mut fixed = GradientOperator::new(&info, PixelType::Bgra8Fixed);
    assert!(fixed.output_format(&OutputFormat::new(16, 16)).is_none());
}

fn background_fills(op: &mut GradientOperator) -> f32 {
    op.info_channel(2).unwrap().value
}

#[test]
fn turning_pipelining_off_returns_the_lent_slot() {
    let info = NodeInfo::new("/test/gradient", 5);
    let mut op = GradientOperator::new(&info, PixelType::Rgba8Fixed);
    let mut params = ParameterStore::default();
    op.setup_parameters(&mut ParameterManager::new(&mut params));
    let pipelined = |params: &mut ParameterStore, on: bool| {
        params
            .set("Pipelined", crate::operator::params::ParameterValue::Toggle(on))
            .unwrap();
    };

    let mut slots = CpuSlots::new(256, 256, PixelType::Rgba8Fixed);
    cook_once(&mut op, &mut slots, &params, 0.1);
    assert_eq!((0..SLOT_COUNT).filter(|&i| slots.is_lent(i)).count(), 1);

    pipelined(&mut params, false);
    cook_once(&mut op, &mut slots, &params, 0.1);
    assert!((0..SLOT_COUNT).all(|i| slots.is_resident(i) && !slots.is_lent(i)));

    pipelined(&mut params, true);
    let before = background_fills(&mut op);
    for _ in 0..200 {
        cook_once(&mut op, &mut slots, &params, 0.1);
        if background_fills(&mut op) > before {
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(10));
    }
    assert!(background_fills(&mut op) > before);
    assert_eq!((0..SLOT_COUNT).filter(|&i| slots.is_lent(i)).count(), 1);
}
