//! The fixed dataset catalog.

use std::path::PathBuf;

use crate::collector::INSTRUMENTS;
use crate::config::FeedsConfig;
use crate::session::{layout, ObservingDate};

use super::types::{DatasetGroup, DatasetRequest, DatasetSource};

/// Seeing flat-file kinds published per night.
pub const SEEING_KINDS: [&str; 3] = ["dimm", "mass", "masspro"];

/// Weather channels plotted for an instrument.
pub fn weather_channels(instrument: u8) -> Vec<String> {
    vec![
        "k0:met:tempRaw".to_string(),
        format!("k{}:met:tempRaw", instrument),
        format!("k{}:dcs:sec:acsTemp", instrument),
        format!("k{}:dcs:sec:secondaryTemp", instrument),
        "k0:met:humidityRaw".to_string(),
        format!("k{}:met:humidityRaw", instrument),
        "k0:met:pressureRaw".to_string(),
        "k0:met:dewpointRaw".to_string(),
    ]
}

/// Image quality channels plotted for an instrument.
pub fn fwhm_channels(instrument: u8) -> Vec<String> {
    vec![format!("k{}:dcs:pnt:cam0:fwhm", instrument)]
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path)
}

/// Every dataset fetched for `date`, in fetch order.
pub fn dataset_catalog(feeds: &FeedsConfig, date: &ObservingDate) -> Vec<DatasetRequest> {
    let compact = date.compact();
    let mut catalog = Vec::new();

    for instrument in INSTRUMENTS {
        let Some(url) = feeds.archiver_url(instrument) else {
            continue;
        };
        for (kind, channels) in [
            ("weather", weather_channels(instrument)),
            ("fwhm", fwhm_channels(instrument)),
        ] {
            let id = format!("k{}_{}", instrument, kind);
            catalog.push(DatasetRequest {
                destination: PathBuf::from(format!("{}.json", id)),
                id,
                group: DatasetGroup::Telemetry,
                source: DatasetSource::Archiver {
                    url: url.to_string(),
                    channels,
                },
            });
        }
    }

    catalog.push(DatasetRequest {
        id: "skyprobe".to_string(),
        group: DatasetGroup::Skyprobe,
        source: DatasetSource::File {
            url: join_url(&feeds.skyprobe_url, &format!("mcal_{}.png", compact)),
        },
        destination: PathBuf::from(layout::SKYPROBE_DIR).join("skyprobe.png"),
    });

    for kind in SEEING_KINDS {
        catalog.push(DatasetRequest {
            id: kind.to_string(),
            group: DatasetGroup::Seeing,
            source: DatasetSource::File {
                url: join_url(&feeds.seeing_url, &format!("{}/{}.{}.dat", kind, compact, kind)),
            },
            destination: PathBuf::from(layout::MASSDIMM_DIR)
                .join(format!("{}.mkwc.{}.dat", compact, kind)),
        });
    }

    let dated_plots = [
        ("seeing_timeseries", format!("{}.wrf-vs-mkam.timeseries.jpg", compact)),
        ("mass_profile", format!("{}.massprofile.jpg", compact)),
    ];
    for (id, file) in dated_plots {
        catalog.push(DatasetRequest {
            id: id.to_string(),
            group: DatasetGroup::Seeing,
            source: DatasetSource::File {
                url: join_url(&feeds.seeing_plots_url, &format!("images/{}", file)),
            },
            destination: PathBuf::from(layout::MASSDIMM_DIR).join(file),
        });
    }

    // Histograms are published under a fixed name and dated locally
    for (id, file) in [
        ("dimm_histogram", "dimmdailyhistogram.jpg"),
        ("mass_histogram", "massdailyhistogram.jpg"),
    ] {
        catalog.push(DatasetRequest {
            id: id.to_string(),
            group: DatasetGroup::Seeing,
            source: DatasetSource::File {
                url: join_url(&feeds.seeing_plots_url, &format!("analysis/images/{}", file)),
            },
            destination: PathBuf::from(layout::MASSDIMM_DIR).join(format!("{}.{}", compact, file)),
        });
    }

    catalog
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    fn catalog() -> Vec<DatasetRequest> {
        let mut feeds = fixtures::offline_config().feeds;
        feeds.seeing_url = "http://seeing.example.org/current/seeing/".to_string();
        feeds.seeing_plots_url = "http://plots.example.org/current/seeing".to_string();
        feeds.skyprobe_url = "http://skyprobe.example.org/archive".to_string();
        dataset_catalog(&feeds, &ObservingDate::parse("2024-03-15").unwrap())
    }

    fn find<'a>(catalog: &'a [DatasetRequest], id: &str) -> &'a DatasetRequest {
        catalog.iter().find(|d| d.id == id).unwrap()
    }

    #[test]
    fn test_catalog_ids_are_unique_and_complete() {
        let catalog = catalog();
        let mut ids: Vec<&str> = catalog.iter().map(|d| d.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), catalog.len());
        assert_eq!(catalog.len(), 4 + 1 + 3 + 4);
    }

    #[test]
    fn test_seeing_file_urls_and_destinations() {
        let catalog = catalog();
        let dimm = find(&catalog, "dimm");
        assert_eq!(
            dimm.source,
            DatasetSource::File {
                url: "http://seeing.example.org/current/seeing/dimm/20240315.dimm.dat".to_string()
            }
        );
        assert_eq!(dimm.destination, PathBuf::from("massdimm/20240315.mkwc.dimm.dat"));
        assert_eq!(dimm.group, DatasetGroup::Seeing);

        let masspro = find(&catalog, "masspro");
        assert_eq!(
            masspro.destination,
            PathBuf::from("massdimm/20240315.mkwc.masspro.dat")
        );
    }

    #[test]
    fn test_skyprobe_and_plot_entries() {
        let catalog = catalog();
        let skyprobe = find(&catalog, "skyprobe");
        assert_eq!(
            skyprobe.source,
            DatasetSource::File {
                url: "http://skyprobe.example.org/archive/mcal_20240315.png".to_string()
            }
        );
        assert_eq!(skyprobe.destination, PathBuf::from("skyprobe/skyprobe.png"));

        let histogram = find(&catalog, "dimm_histogram");
        assert_eq!(
            histogram.destination,
            PathBuf::from("massdimm/20240315.dimmdailyhistogram.jpg")
        );
        let timeseries = find(&catalog, "seeing_timeseries");
        assert_eq!(
            timeseries.source,
            DatasetSource::File {
                url: "http://plots.example.org/current/seeing/images/20240315.wrf-vs-mkam.timeseries.jpg"
                    .to_string()
            }
        );
    }

    #[test]
    fn test_telemetry_entries_per_instrument() {
        let catalog = catalog();
        let weather = find(&catalog, "k2_weather");
        assert_eq!(weather.group, DatasetGroup::Telemetry);
        assert_eq!(weather.destination, PathBuf::from("k2_weather.json"));
        match &weather.source {
            DatasetSource::Archiver { channels, .. } => {
                assert_eq!(channels.len(), 8);
                assert!(channels.contains(&"k2:dcs:sec:acsTemp".to_string()));
                assert!(channels.contains(&"k0:met:dewpointRaw".to_string()));
            }
            other => panic!("unexpected source {:?}", other),
        }

        match &find(&catalog, "k1_fwhm").source {
            DatasetSource::Archiver { channels, .. } => {
                assert_eq!(channels, &vec!["k1:dcs:pnt:cam0:fwhm".to_string()]);
            }
            other => panic!("unexpected source {:?}", other),
        }
    }
}
