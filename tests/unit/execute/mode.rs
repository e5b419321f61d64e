use super::*;

fn settings(mode: ExecuteMode, pixel_type: PixelType) -> GeneralSettings {
    GeneralSettings {
        execute_mode: mode,
        pixel_type,
        ..GeneralSettings::default()
    }
}

#[test]
fn defaults_match_host_conventions() {
    let s = GeneralSettings::default();
    assert!(s.clear_buffers);
    assert!(!s.cook_every_frame);
    assert_eq!(s.execute_mode, ExecuteMode::RenderTarget);
    assert_eq!(s.pixel_type, PixelType::Bgra8Fixed);
}

#[test]
fn first_selection_latches() {
    let mut latch = ModeLatch::default();
    assert_eq!(latch.latched(), None);
    let sel = latch.select(&settings(ExecuteMode::CpuWriteOnly, PixelType::Rgba32Float));
    assert_eq!(sel.mode, ExecuteMode::CpuWriteOnly);
    assert_eq!(sel.pixel_type, PixelType::Rgba32Float);
    assert!(sel.conflict.is_none());
    assert_eq!(latch.latched(), Some(ExecuteMode::CpuWriteOnly));
}

#[test]
fn later_mode_change_is_ignored_with_conflict() {
    let mut latch = ModeLatch::default();
    latch.select(&settings(ExecuteMode::CpuReadWrite, PixelType::Rgba8Fixed));
    let sel = latch.select(&settings(ExecuteMode::RenderTarget, PixelType::Rgba8Fixed));
    assert_eq!(sel.mode, ExecuteMode::CpuReadWrite);
    assert!(sel.conflict.unwrap().contains("fixed"));
}

#[test]
fn pixel_type_change_only_conflicts_in_cpu_modes() {
    let mut latch = ModeLatch::default();
    latch.select(&settings(ExecuteMode::RenderTarget, PixelType::Bgra8Fixed));
    let sel = latch.select(&settings(ExecuteMode::RenderTarget, PixelType::Rgba32Float));
    assert!(sel.conflict.is_none());

    let mut latch = ModeLatch::default();
    latch.select(&settings(ExecuteMode::CpuWriteOnly, PixelType::Bgra8Fixed));
    let sel = latch.select(&settings(ExecuteMode::CpuWriteOnly, PixelType::Rgba32Float));
    assert_eq!(sel.pixel_type, PixelType::Bgra8Fixed);
    assert!(sel.conflict.is_some());
}

#[test]
fn cpu_predicate() {
    assert!(!ExecuteMode::RenderTarget.is_cpu());
    assert!(ExecuteMode::CpuWriteOnly.is_cpu());
    assert!(ExecuteMode::CpuReadWrite.is_cpu());
}
