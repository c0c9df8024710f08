//! Integration tests for u-arrange-d2.

use approx::assert_relative_eq;
use u_arrange_d2::{
    arrange, placed_aabb, Bed2D, BinId, BottomLeftPlacer, Config, Error, Item, NestControl,
    Nester, PackGroup, PlacerConfig2D, Polygon2D, SelectionStrategy, Shape, Transform2D,
};

fn rect(name: &str, w: f64, h: f64) -> Item<Polygon2D> {
    Item::new(Polygon2D::rectangle(w, h)).with_name(name)
}

fn overlap(a: [f64; 4], b: [f64; 4]) -> bool {
    a[0] < b[2] - 1e-9 && b[0] < a[2] - 1e-9 && a[1] < b[3] - 1e-9 && b[1] < a[3] - 1e-9
}

/// Checks every plate: outlines inside the bed, outlines at least `gap` apart.
fn assert_valid_layout(layout: &PackGroup<Polygon2D>, bed: &Bed2D, gap: f64) {
    for plate in layout {
        let boxes: Vec<[f64; 4]> = plate
            .iter()
            .map(|item| {
                let (min, max) = item.transformed_shape().aabb();
                [min[0], min[1], max[0], max[1]]
            })
            .collect();

        for b in &boxes {
            assert!(bed.contains_box(*b), "box {:?} leaves the plate", b);
        }
        for (i, a) in boxes.iter().enumerate() {
            for b in &boxes[i + 1..] {
                let grown = [a[0] - gap, a[1] - gap, a[2] + gap, a[3] + gap];
                assert!(!overlap(grown, *b), "boxes {:?} and {:?} too close", a, b);
            }
        }
    }
}

mod geometry_tests {
    use super::*;

    #[test]
    fn test_rectangle_geometry() {
        let rect = Polygon2D::rectangle(20.0, 15.0);
        assert_relative_eq!(rect.area(), 300.0, epsilon = 0.001);
        assert_eq!(rect.exterior().len(), 4);
    }

    #[test]
    fn test_circle_approximation() {
        let circle = Polygon2D::circle(10.0, 64);
        let expected_area = std::f64::consts::PI * 10.0 * 10.0;
        assert!(
            (circle.area() - expected_area).abs() < 3.0,
            "Circle area {} should be close to {}",
            circle.area(),
            expected_area
        );
        assert_eq!(circle.exterior().len(), 64);
    }

    #[test]
    fn test_item_area_follows_shape() {
        let item = Item::new(Polygon2D::l_shape(30.0, 30.0, 15.0, 15.0));
        // 30*15 + 15*15
        assert_relative_eq!(item.area(), 675.0, epsilon = 0.001);
    }

    #[test]
    fn test_transformed_shape_uses_item_transform() {
        let item = rect("r", 10.0, 5.0).with_transform(Transform2D::translation(3.0, 4.0));
        let (min, max) = item.transformed_shape().aabb();
        assert_relative_eq!(min[0], 3.0);
        assert_relative_eq!(min[1], 4.0);
        assert_relative_eq!(max[0], 13.0);
        assert_relative_eq!(max[1], 9.0);
    }
}

mod arrange_tests {
    use super::*;

    #[test]
    fn test_single_plate() {
        let bed = Bed2D::rectangle(100.0, 100.0);
        let mut items: Vec<_> = (0..4).map(|i| rect(&format!("r{}", i), 40.0, 40.0)).collect();

        let mut nester: Nester<Polygon2D, BottomLeftPlacer> =
            Nester::new(bed.clone(), Config::new());
        let packed = nester.execute(&mut items).unwrap();

        assert_eq!(packed, 4);
        assert_eq!(nester.last_result().len(), 1);
        assert_valid_layout(nester.last_result(), &bed, 0.0);
    }

    #[test]
    fn test_overflow_opens_plates() {
        let bed = Bed2D::rectangle(100.0, 100.0);
        let mut items: Vec<_> = (0..9).map(|i| rect(&format!("r{}", i), 50.0, 50.0)).collect();

        let packed = arrange(&mut items, &bed, 0.0, Config::new(), NestControl::new()).unwrap();

        assert_eq!(packed, 9);
        let plates: Vec<usize> = items.iter().filter_map(|i| i.bin_id().index()).collect();
        assert_eq!(plates.iter().max(), Some(&2));
        for plate in 0..3 {
            let count = plates.iter().filter(|&&p| p == plate).count();
            assert_eq!(count, if plate < 2 { 4 } else { 1 });
        }
    }

    #[test]
    fn test_min_gap_is_respected() {
        let bed = Bed2D::rectangle(120.0, 120.0);
        let mut items: Vec<_> = (0..12)
            .map(|i| rect(&format!("r{}", i), 10.0 + (i % 3) as f64 * 5.0, 12.0))
            .collect();

        let mut nester: Nester<Polygon2D, BottomLeftPlacer> =
            Nester::new(bed.clone(), Config::new()).with_min_gap(4.0);
        let packed = nester.execute(&mut items).unwrap();

        assert_eq!(packed, 12);
        assert_valid_layout(nester.last_result(), &bed, 4.0);
        assert!(items.iter().all(|i| i.inflation() == 0.0));
    }

    #[test]
    fn test_rotation_makes_item_fit() {
        let bed = Bed2D::rectangle(30.0, 100.0);
        let mut items = vec![rect("long", 80.0, 20.0)];

        let packed = arrange(&mut items, &bed, 0.0, Config::new(), NestControl::new()).unwrap();
        assert_eq!(packed, 0);
        assert_eq!(items[0].bin_id(), BinId::Unfit);

        let config =
            Config::new().with_placer(PlacerConfig2D::new().with_rotations_deg(vec![0.0, 90.0]));
        let packed = arrange(&mut items, &bed, 0.0, config, NestControl::new()).unwrap();
        assert_eq!(packed, 1);
        assert_relative_eq!(
            items[0].transform().angle,
            std::f64::consts::FRAC_PI_2,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_excluded_region_is_avoided() {
        let bed = Bed2D::rectangle(100.0, 100.0);
        let purge = rect("purge", 20.0, 100.0);
        let config = Config::new().with_excluded_item(purge);
        let mut items: Vec<_> = (0..2).map(|i| rect(&format!("r{}", i), 40.0, 40.0)).collect();

        let mut nester: Nester<Polygon2D, BottomLeftPlacer> =
            Nester::new(bed.clone(), config);
        nester.execute(&mut items).unwrap();

        for item in &items {
            assert!(placed_aabb(item)[0] >= 20.0 - 1e-9);
        }
        assert!(nester
            .last_result()
            .iter()
            .flatten()
            .all(|item| item.name() != "purge"));
    }

    #[test]
    fn test_fixed_item_is_kept() {
        let bed = Bed2D::rectangle(100.0, 100.0);
        let fixed = rect("fixed", 50.0, 50.0)
            .with_transform(Transform2D::translation(50.0, 50.0))
            .fixed_in_bin(1);
        let mut items = vec![fixed, rect("a", 50.0, 50.0), rect("b", 50.0, 50.0)];

        let mut nester: Nester<Polygon2D, BottomLeftPlacer> =
            Nester::new(bed.clone(), Config::new());
        let packed = nester.execute(&mut items).unwrap();

        assert_eq!(packed, 2);
        assert_eq!(items[0].bin_id(), BinId::Bin(1));
        assert_relative_eq!(items[0].transform().tx, 50.0);
        assert!(nester.last_result()[1].iter().any(|i| i.name() == "fixed"));
        assert_valid_layout(nester.last_result(), &bed, 0.0);
    }

    #[test]
    fn test_oversized_item_reports_unfit() {
        let unfit = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let control = {
            let unfit = std::sync::Arc::clone(&unfit);
            NestControl::new()
                .with_unfit(move |name| unfit.lock().unwrap().push(name.to_string()))
        };

        let bed = Bed2D::rectangle(50.0, 50.0);
        let mut items = vec![rect("huge", 60.0, 10.0), rect("ok", 10.0, 10.0)];
        let packed = arrange(&mut items, &bed, 0.0, Config::new(), control).unwrap();

        assert_eq!(packed, 1);
        assert_eq!(items[0].bin_id(), BinId::Unfit);
        assert_eq!(*unfit.lock().unwrap(), vec!["huge"]);
    }

    #[test]
    fn test_filler_strategy() {
        let bed = Bed2D::rectangle(100.0, 100.0);
        let mut items: Vec<_> = (0..5).map(|i| rect(&format!("r{}", i), 50.0, 50.0)).collect();
        let config = Config::new().with_strategy(SelectionStrategy::Filler);

        let packed = arrange(&mut items, &bed, 0.0, config, NestControl::new()).unwrap();
        assert_eq!(packed, 5);
        assert_eq!(items[4].bin_id(), BinId::Bin(1));
    }

    #[test]
    fn test_invalid_inputs() {
        let mut items = vec![rect("a", 10.0, 10.0)];
        let err = arrange(
            &mut items,
            &Bed2D::rectangle(0.0, 10.0),
            0.0,
            Config::new(),
            NestControl::new(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidBoundary(_)));

        let mut items = vec![rect("nan", f64::NAN, 10.0)];
        let err = arrange(
            &mut items,
            &Bed2D::rectangle(10.0, 10.0),
            0.0,
            Config::new(),
            NestControl::new(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidItem(_)));
    }

    #[test]
    fn test_degenerate_outline_is_unfit() {
        let mut items = vec![
            Item::new(Polygon2D::new().with_polygon(vec![(0.0, 0.0), (1.0, 1.0)])),
            rect("ok", 10.0, 10.0),
        ];
        let packed = arrange(
            &mut items,
            &Bed2D::rectangle(10.0, 10.0),
            0.0,
            Config::new(),
            NestControl::new(),
        )
        .unwrap();

        assert_eq!(packed, 1);
        assert_eq!(items[0].bin_id(), BinId::Unfit);
    }
}
