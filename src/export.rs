//! CSV export of collected spectral signatures.
//!
//! Layout: one row per channel of the cube the first point was taken from.
//! The first column is the wavelength (or channel index) axis and every
//! further column holds one point's raw samples.
//!
//! ```text
//! Wavelength (nm),"Point 1 (2, 1)","Point 2 (7, 4)"
//! 400,0.12,0.33
//! 500,0.15,0.31
//! ```

use std::io::Write;
use std::path::Path;

use csv::WriterBuilder;

use crate::error::{EngineError, Result};
use crate::model::{PointStore, WavelengthRange, axis_for, axis_label};

/// Header row: axis label followed by one label per point.
pub fn header(points: &PointStore, range: Option<&WavelengthRange>) -> Vec<String> {
    std::iter::once(axis_label(range).to_string())
        .chain(
            points
                .iter()
                .enumerate()
                .map(|(i, point)| point.label(i + 1)),
        )
        .collect()
}

/// Write the table to any writer.
///
/// Cells for channels a point did not capture are left empty.
pub fn write_csv<W: Write>(
    points: &PointStore,
    range: Option<&WavelengthRange>,
    writer: W,
) -> Result<()> {
    let first = points.all().first().ok_or(EngineError::EmptyExport)?;
    let rows = first.channel_count;
    let axis = axis_for(rows, range);

    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(header(points, range))?;

    for (channel, axis_value) in axis.iter().enumerate() {
        let mut record = Vec::with_capacity(points.len() + 1);
        record.push(axis_value.to_string());
        for point in points {
            record.push(
                point
                    .sample(channel)
                    .map(|v| v.to_string())
                    .unwrap_or_default(),
            );
        }
        wtr.write_record(&record)?;
    }
    wtr.flush()?;

    log::info!(
        "Exported {} point(s) x {} channel(s)",
        points.len(),
        rows
    );
    Ok(())
}

/// Serialize the table to UTF-8 bytes.
pub fn export_csv(points: &PointStore, range: Option<&WavelengthRange>) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_csv(points, range, &mut buffer)?;
    Ok(buffer)
}

/// Write the table to `path`, replacing any existing file.
pub fn export_to_path(
    points: &PointStore,
    range: Option<&WavelengthRange>,
    path: &Path,
) -> Result<()> {
    // check first so an empty store never truncates an existing file
    if points.is_empty() {
        return Err(EngineError::EmptyExport);
    }
    let file = std::fs::File::create(path)?;
    write_csv(points, range, std::io::BufWriter::new(file))?;
    log::debug!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Cube;

    fn cube(channels: usize) -> Cube {
        Cube::from_shape_fn(10, 10, channels, |(y, x, c)| (y * 100 + x * 10 + c) as f64).unwrap()
    }

    fn parse(bytes: &[u8]) -> Vec<Vec<String>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(bytes);
        reader
            .records()
            .map(|r| r.unwrap().iter().map(String::from).collect())
            .collect()
    }

    #[test]
    fn test_empty_store() {
        let store = PointStore::new();
        assert!(matches!(
            export_csv(&store, None),
            Err(EngineError::EmptyExport)
        ));
    }

    #[test]
    fn test_shape_is_channels_by_points() {
        let cube = cube(6);
        let mut store = PointStore::new();
        store.append(1, 2, &cube).unwrap();
        store.append(3, 4, &cube).unwrap();
        store.append(9, 9, &cube).unwrap();

        let table = parse(&export_csv(&store, None).unwrap());
        // header + one row per channel
        assert_eq!(table.len(), 1 + 6);
        assert!(table.iter().all(|row| row.len() == 1 + 3));
    }

    #[test]
    fn test_header_and_values() {
        let cube = cube(4);
        let range = WavelengthRange::new(400.0, 700.0).unwrap();
        let mut store = PointStore::new();
        store.append(2, 1, &cube).unwrap();

        let table = parse(&export_csv(&store, Some(&range)).unwrap());
        assert_eq!(table[0], vec!["Wavelength (nm)", "Point 1 (2, 1)"]);
        assert_eq!(table[1], vec!["400", "120"]);
        assert_eq!(table[4], vec!["700", "123"]);
    }

    #[test]
    fn test_channel_axis_without_range() {
        let cube = cube(3);
        let mut store = PointStore::new();
        store.append(0, 0, &cube).unwrap();

        let table = parse(&export_csv(&store, None).unwrap());
        assert_eq!(table[0][0], "Channel");
        let axis: Vec<&str> = table[1..].iter().map(|row| row[0].as_str()).collect();
        assert_eq!(axis, vec!["0", "1", "2"]);
    }

    #[test]
    fn test_partial_range_leaves_blanks() {
        let cube = cube(5);
        let mut store = PointStore::new();
        store.append(0, 0, &cube).unwrap();
        store.append_range(1, 0, &cube, 2..4).unwrap();

        let table = parse(&export_csv(&store, None).unwrap());
        assert_eq!(table[1][2], "");
        assert_eq!(table[3][2], "12");
        assert_eq!(table[5][2], "");
    }

    #[test]
    fn test_export_to_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(crate::constants::DEFAULT_EXPORT_FILENAME);

        let cube = cube(2);
        let mut store = PointStore::new();
        store.append(0, 0, &cube).unwrap();
        export_to_path(&store, None, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Channel,\"Point 1 (0, 0)\""));
    }

    #[test]
    fn test_empty_export_keeps_existing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("existing.csv");
        std::fs::write(&path, "keep me").unwrap();

        let err = export_to_path(&PointStore::new(), None, &path).unwrap_err();
        assert!(matches!(err, EngineError::EmptyExport));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep me");
    }
}
