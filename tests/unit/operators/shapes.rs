use super::*;

#[test]
fn polygon_has_one_segment_per_side() {
    let path = polygon(6, 10.0);
    let els = path.elements();
    assert_eq!(els.len(), 6 + 1);
    assert!(matches!(els.last(), Some(kurbo::PathEl::ClosePath)));
    assert!(matches!(els[0], kurbo::PathEl::MoveTo(p) if (p.y + 10.0).abs() < 1e-9));
}

#[test]
fn polygon_clamps_to_triangle() {
    assert_eq!(polygon(1, 5.0).elements().len(), 3 + 1);
}

#[test]
fn conversions_preserve_geometry() {
    let a = kurbo::Affine::translate((3.0, 4.0)) * kurbo::Affine::scale(2.0);
    assert_eq!(affine_to_cpu(a).as_coeffs(), a.as_coeffs());
    let cpu = bezpath_to_cpu(&polygon(4, 1.0));
    assert_eq!(cpu.elements().len(), 5);
}

#[test]
fn requests_multisampled_depth_and_two_targets() {
    let mut op = ShapesOperator::new(&NodeInfo::new("/test/shapes", 1));
    let req = op.output_format(&OutputFormat::new(64, 32)).unwrap();
    assert_eq!((req.width, req.height), (64, 32));
    assert_eq!(req.anti_alias, 4);
    assert_eq!(req.color_buffers, 2);
    assert_eq!(req.depth_bits, 24);
}
