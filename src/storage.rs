use crate::grouping::Grouped;
use anyhow::Result;
use csv::WriterBuilder;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Save grouped series as long-format CSV with header, one row per (label, series).
pub fn save_csv<P: AsRef<Path>>(grouped: &Grouped, path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.serialize(("time", "parameter", "unit", "axis", "value"))?;
    for s in &grouped.series {
        for (label, value) in grouped.labels.iter().zip(&s.values) {
            wtr.serialize((label, &s.name, &s.unit, &s.axis_id, value))?;
        }
    }
    wtr.flush()?;
    Ok(())
}

/// Save labels, series and axes as one pretty JSON object.
pub fn save_json<P: AsRef<Path>>(grouped: &Grouped, path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(grouped)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Axis, AxisPosition, Series};
    use tempfile::tempdir;

    #[test]
    fn write_csv_and_json() {
        let dir = tempdir().unwrap();
        let csvp = dir.path().join("x.csv");
        let jsonp = dir.path().join("x.json");
        let grouped = Grouped {
            labels: vec!["Jan 1, 1 AM".into(), "Jan 1, 2 AM".into()],
            series: vec![Series {
                name: "rain".into(),
                unit: "mm".into(),
                values: vec![Some(0.2), None],
                color: "#037691".into(),
                axis_id: "y0".into(),
            }],
            axes: vec![Axis {
                id: "y0".into(),
                unit: "mm".into(),
                position: AxisPosition::Left,
                is_first: true,
            }],
        };
        save_csv(&grouped, &csvp).unwrap();
        save_json(&grouped, &jsonp).unwrap();

        let text = std::fs::read_to_string(&csvp).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "time,parameter,unit,axis,value");
        assert_eq!(lines.len(), 3);
        assert!(lines[2].ends_with("y0,"));

        let back: Grouped = serde_json::from_str(&std::fs::read_to_string(&jsonp).unwrap()).unwrap();
        assert_eq!(back, grouped);
    }
}
