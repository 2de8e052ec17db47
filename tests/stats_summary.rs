use wxchart_rs::models::Series;
use wxchart_rs::stats::{series_summary, summarize};

fn series(name: &str, values: Vec<Option<f64>>) -> Series {
    Series {
        name: name.into(),
        unit: "mm".into(),
        values,
        color: "#037691".into(),
        axis_id: "y0".into(),
    }
}

#[test]
fn summary_ignores_gaps() {
    let s = summarize(&series("rain", vec![Some(3.0), None, Some(1.0), Some(2.0), None]));
    assert_eq!(s.count, 3);
    assert_eq!(s.missing, 2);
    assert_eq!(s.min, Some(1.0));
    assert_eq!(s.max, Some(3.0));
    assert_eq!(s.mean, Some(2.0));
    assert_eq!(s.median, Some(2.0));
}

#[test]
fn even_count_median_and_empty_series() {
    let all = series_summary(&[
        series("a", vec![Some(1.0), Some(4.0), Some(2.0), Some(3.0)]),
        series("b", vec![None, None]),
    ]);
    assert_eq!(all[0].median, Some(2.5));
    assert_eq!(all[1].parameter, "b");
    assert_eq!(all[1].count, 0);
    assert_eq!(all[1].mean, None);
}
