use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

use super::error::CatalogError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StreamType {
    Audio,
    Video,
    Subtitle,
    EmbeddedImage,
    Data,
    Lyric,
}

/// One elementary stream of a media source, in the catalog's wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MediaStream {
    #[serde(rename = "Type")]
    pub stream_type: StreamType,
    pub index: u32,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub codec: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

/// A playable source of a catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MediaSourceDescriptor {
    pub id: String,
    /// Expected byte count of the original file.
    #[serde(rename = "Size", default)]
    pub size_bytes: u64,
    #[serde(default)]
    pub container: Option<String>,
    /// Location of the file on the media server's own disk, when known.
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub media_streams: Vec<MediaStream>,
}

impl MediaSourceDescriptor {
    pub fn streams_of(&self, stream_type: StreamType) -> impl Iterator<Item = &MediaStream> {
        self.media_streams
            .iter()
            .filter(move |stream| stream.stream_type == stream_type)
    }

    pub fn video_stream(&self) -> Option<&MediaStream> {
        self.streams_of(StreamType::Video).next()
    }

    pub fn has_audio(&self) -> bool {
        self.streams_of(StreamType::Audio).next().is_some()
    }
}

/// Which audio and subtitle streams a download should carry, by catalog
/// stream index. `None` leaves the choice to the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamSelection {
    pub audio_stream_index: Option<u32>,
    pub subtitle_stream_index: Option<u32>,
}

impl StreamSelection {
    /// Every chosen index must name a stream of the matching type in `source`.
    pub fn validate(&self, item_id: &str, source: &MediaSourceDescriptor) -> Result<(), CatalogError> {
        let chosen = [
            (self.audio_stream_index, StreamType::Audio),
            (self.subtitle_stream_index, StreamType::Subtitle),
        ];
        for (index, expected) in chosen {
            let Some(index) = index else { continue };
            if !source.streams_of(expected).any(|stream| stream.index == index) {
                return Err(CatalogError::InvalidStreamSelection {
                    item_id: item_id.to_string(),
                    index,
                    expected,
                });
            }
        }
        Ok(())
    }

    /// Adds `audioStreamIndex` / `subtitleStreamIndex` query parameters for
    /// the chosen streams.
    pub fn append_to(&self, url: &mut Url) {
        let mut query = url.query_pairs_mut();
        if let Some(index) = self.audio_stream_index {
            query.append_pair("audioStreamIndex", &index.to_string());
        }
        if let Some(index) = self.subtitle_stream_index {
            query.append_pair("subtitleStreamIndex", &index.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.audio_stream_index.is_none() && self.subtitle_stream_index.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CatalogItem {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub media_sources: Vec<MediaSourceDescriptor>,
}

impl CatalogItem {
    /// The single source clips are cut from. Items without exactly one
    /// source, or whose source carries no audio, cannot be clipped.
    pub fn primary_source(&self) -> Result<&MediaSourceDescriptor, CatalogError> {
        let source = match self.media_sources.as_slice() {
            [] => {
                return Err(CatalogError::NotFound {
                    item_id: self.id.clone(),
                })
            }
            [source] => source,
            sources => {
                return Err(CatalogError::MultipleSources {
                    item_id: self.id.clone(),
                    count: sources.len(),
                })
            }
        };
        if !source.has_audio() {
            return Err(CatalogError::NoAudioStreams {
                item_id: self.id.clone(),
            });
        }
        Ok(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(stream_type: StreamType, index: u32) -> MediaStream {
        MediaStream {
            stream_type,
            index,
            language: None,
            codec: None,
            title: None,
            is_default: false,
        }
    }

    fn source(id: &str, streams: Vec<MediaStream>) -> MediaSourceDescriptor {
        MediaSourceDescriptor {
            id: id.into(),
            size_bytes: 1_000,
            container: Some("mkv".into()),
            path: None,
            media_streams: streams,
        }
    }

    #[test]
    fn primary_source_requires_exactly_one_source_with_audio() {
        let mut item = CatalogItem {
            id: "item".into(),
            name: None,
            media_sources: Vec::new(),
        };
        assert_eq!(
            item.primary_source(),
            Err(CatalogError::NotFound {
                item_id: "item".into()
            })
        );

        item.media_sources = vec![source("a", vec![stream(StreamType::Video, 0)])];
        assert_eq!(
            item.primary_source(),
            Err(CatalogError::NoAudioStreams {
                item_id: "item".into()
            })
        );

        item.media_sources[0]
            .media_streams
            .push(stream(StreamType::Audio, 1));
        assert_eq!(item.primary_source().unwrap().id, "a");

        item.media_sources.push(source("b", Vec::new()));
        assert_eq!(
            item.primary_source(),
            Err(CatalogError::MultipleSources {
                item_id: "item".into(),
                count: 2
            })
        );
    }

    #[test]
    fn selection_must_name_streams_of_the_right_type() {
        let source = source(
            "a",
            vec![
                stream(StreamType::Video, 0),
                stream(StreamType::Audio, 1),
                stream(StreamType::Subtitle, 2),
            ],
        );
        let valid = StreamSelection {
            audio_stream_index: Some(1),
            subtitle_stream_index: Some(2),
        };
        assert_eq!(valid.validate("item", &source), Ok(()));
        assert_eq!(StreamSelection::default().validate("item", &source), Ok(()));

        let swapped = StreamSelection {
            audio_stream_index: Some(2),
            subtitle_stream_index: None,
        };
        assert_eq!(
            swapped.validate("item", &source),
            Err(CatalogError::InvalidStreamSelection {
                item_id: "item".into(),
                index: 2,
                expected: StreamType::Audio,
            })
        );

        let missing = StreamSelection {
            audio_stream_index: None,
            subtitle_stream_index: Some(9),
        };
        assert!(matches!(
            missing.validate("item", &source),
            Err(CatalogError::InvalidStreamSelection {
                index: 9,
                expected: StreamType::Subtitle,
                ..
            })
        ));
    }

    #[test]
    fn selection_becomes_query_parameters() {
        let mut url = Url::parse("https://media.local/Videos/abc/stream?static=false").unwrap();
        StreamSelection {
            audio_stream_index: Some(1),
            subtitle_stream_index: None,
        }
        .append_to(&mut url);
        assert_eq!(
            url.as_str(),
            "https://media.local/Videos/abc/stream?static=false&audioStreamIndex=1"
        );
    }

    #[test]
    fn parses_catalog_wire_shape() {
        let raw = r#"{
            "Id": "abc",
            "Name": "Film",
            "MediaSources": [{
                "Id": "src",
                "Size": 52428800,
                "Container": "mkv",
                "MediaStreams": [
                    {"Type": "Video", "Index": 0, "Codec": "hevc"},
                    {"Type": "Audio", "Index": 1, "Codec": "aac", "Language": "eng", "IsDefault": true},
                    {"Type": "Subtitle", "Index": 2, "Codec": "subrip", "Language": "fre"}
                ]
            }]
        }"#;
        let item: CatalogItem = serde_json::from_str(raw).unwrap();
        let source = item.primary_source().unwrap();
        assert_eq!(source.size_bytes, 52_428_800);
        assert_eq!(source.video_stream().unwrap().codec.as_deref(), Some("hevc"));
        assert_eq!(source.streams_of(StreamType::Subtitle).count(), 1);
        assert!(source.streams_of(StreamType::Audio).all(|s| s.is_default));
    }
}
