//! Reads the batches persisted by the acquisition script.
//!
//! Each file holds the scalar attributes `xorg`, `xinc` and `points`, which
//! describe the time axis, and one two-dimensional dataset (events by samples)
//! per enabled channel. Any other member of the file is ignored.
use crate::pulse_analysis::{AcquisitionParameters, Real};
use hdf5::{File, H5Type};
use ndarray::Array2;
use scope_charge_common::ChannelName;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub(crate) const ORIGIN_ATTRIBUTE: &str = "xorg";
pub(crate) const INTERVAL_ATTRIBUTE: &str = "xinc";
pub(crate) const POINTS_ATTRIBUTE: &str = "points";

#[derive(Debug, Error)]
pub(crate) enum LoaderError {
    #[error("HDF5 Error: {error} in {}", path.display())]
    HDF5 { error: hdf5::Error, path: PathBuf },
    #[error("Invalid sample count {value} in {}", path.display())]
    InvalidPoints { value: Real, path: PathBuf },
    #[error("Requested channel {channel} not found in {}", path.display())]
    MissingChannel { channel: ChannelName, path: PathBuf },
}

trait ConvertResult<T> {
    fn err_file(self, path: &Path) -> Result<T, LoaderError>;
}

impl<T> ConvertResult<T> for hdf5::Result<T> {
    fn err_file(self, path: &Path) -> Result<T, LoaderError> {
        self.map_err(|error| LoaderError::HDF5 {
            error,
            path: path.to_owned(),
        })
    }
}

/// The contents of one acquisition file.
#[derive(Debug, Clone)]
pub(crate) struct PersistedBatch {
    pub(crate) path: PathBuf,
    pub(crate) acquisition: AcquisitionParameters,
    /// Voltages of each channel, in file order.
    pub(crate) channels: Vec<(ChannelName, Array2<Real>)>,
}

fn read_scalar_attribute<T: H5Type>(file: &File, name: &str, path: &Path) -> Result<T, LoaderError> {
    file.attr(name).and_then(|attr| attr.read_scalar()).err_file(path)
}

/// The points attribute is stored as a float.
fn points_from(value: Real, path: &Path) -> Result<usize, LoaderError> {
    if value.is_finite() && value >= 1.0 && value.fract() == 0.0 {
        Ok(value as usize)
    } else {
        Err(LoaderError::InvalidPoints {
            value,
            path: path.to_owned(),
        })
    }
}

/// Loads the channels named in `selected`, or every channel if it is empty.
#[tracing::instrument(skip_all, fields(path = %path.display(), channels))]
pub(crate) fn load_persisted_batch(
    path: &Path,
    selected: &[ChannelName],
) -> Result<PersistedBatch, LoaderError> {
    let file = File::open(path).err_file(path)?;

    let acquisition = AcquisitionParameters {
        origin: read_scalar_attribute(&file, ORIGIN_ATTRIBUTE, path)?,
        interval: read_scalar_attribute(&file, INTERVAL_ATTRIBUTE, path)?,
        points: points_from(read_scalar_attribute(&file, POINTS_ATTRIBUTE, path)?, path)?,
    };
    debug!("Acquisition: {acquisition:?}");

    if let Some(channel) = selected
        .iter()
        .find(|channel| file.dataset(channel).is_err())
    {
        return Err(LoaderError::MissingChannel {
            channel: channel.clone(),
            path: path.to_owned(),
        });
    }

    let mut channels = Vec::new();
    for name in file.member_names().err_file(path)? {
        if !selected.is_empty() && !selected.contains(&name) {
            continue;
        }
        let Ok(dataset) = file.dataset(&name) else {
            debug!("Skipping {name}, not a dataset");
            continue;
        };
        if dataset.ndim() != 2 {
            debug!("Skipping {name}, not two dimensional");
            continue;
        }
        let voltages: Array2<f32> = dataset.read_2d().err_file(path)?;
        channels.push((name, voltages.mapv(Real::from)));
    }
    tracing::Span::current().record("channels", channels.len());
    info!("Loaded {} channel(s)", channels.len());

    Ok(PersistedBatch {
        path: path.to_owned(),
        acquisition,
        channels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::temp_dir;

    fn write_file(path: &Path, points: Real) -> hdf5::Result<()> {
        let file = File::create(path)?;
        file.new_attr::<f64>().create(ORIGIN_ATTRIBUTE)?.write_scalar(&-2e-9)?;
        file.new_attr::<f64>().create(INTERVAL_ATTRIBUTE)?.write_scalar(&1e-9)?;
        file.new_attr::<f64>().create(POINTS_ATTRIBUTE)?.write_scalar(&points)?;

        let channel1 = Array2::<f32>::from_shape_fn((3, 4), |(i, j)| -((i * 4 + j) as f32));
        file.new_dataset_builder()
            .with_data(&channel1)
            .create("channel1")?;
        let channel3 = Array2::<f32>::zeros((3, 4));
        file.new_dataset_builder()
            .with_data(&channel3)
            .create("channel3")?;
        file.create_group("settings")?;
        Ok(())
    }

    #[test]
    fn load_all_channels() {
        let path = temp_dir().join("charge-analyser-load-all.h5");
        write_file(&path, 4.0).expect("file should be written");

        let batch = load_persisted_batch(&path, &[]).expect("file should load");
        assert_eq!(
            batch.acquisition,
            AcquisitionParameters {
                origin: -2e-9,
                interval: 1e-9,
                points: 4
            }
        );
        let names: Vec<_> = batch.channels.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["channel1", "channel3"]);
        assert_eq!(batch.channels[0].1.dim(), (3, 4));
        assert_eq!(batch.channels[0].1[[2, 3]], -11.0);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn load_selected_channel() {
        let path = temp_dir().join("charge-analyser-load-selected.h5");
        write_file(&path, 4.0).expect("file should be written");

        let batch =
            load_persisted_batch(&path, &["channel3".to_owned()]).expect("file should load");
        assert_eq!(batch.channels.len(), 1);
        assert_eq!(batch.channels[0].0, "channel3");

        let result = load_persisted_batch(&path, &["channel2".to_owned()]);
        assert!(matches!(result, Err(LoaderError::MissingChannel { .. })));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn fractional_points() {
        let path = temp_dir().join("charge-analyser-fractional.h5");
        write_file(&path, 4.5).expect("file should be written");
        let result = load_persisted_batch(&path, &[]);
        assert!(matches!(
            result,
            Err(LoaderError::InvalidPoints { value, .. }) if value == 4.5
        ));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_file() {
        let result = load_persisted_batch(Path::new("/nonexistent/charge.h5"), &[]);
        assert!(matches!(result, Err(LoaderError::HDF5 { .. })));
    }
}
