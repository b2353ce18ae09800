use crate::error::Result;
use crate::layout::{self, Layout};
use crate::node::BoxRef;
use serde::Serialize;

/// Every box layout this crate understands.
///
/// Several codes can share one kind (`ftyp`/`styp`, all the visual sample
/// entries, ...). Codes map to kinds through a [`BoxRegistry`](crate::BoxRegistry);
/// anything not registered becomes `KnownBox::Generic`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum KnownBox {
    Generic,

    // File-level
    FileType,
    MediaData,
    FreeSpace,
    ProgressiveDownloadInfo,

    // Movie and track structure
    Movie,
    MovieHeader,
    Track,
    TrackHeader,
    TrackReference,
    TrackReferenceType,
    TrackGroup,
    TrackGroupType,
    Edit,
    EditList,

    // Media
    Media,
    MediaHeader,
    Handler,
    ExtendedLanguage,
    MediaInformation,
    VideoMediaHeader,
    SoundMediaHeader,
    HintMediaHeader,
    NullMediaHeader,
    SubtitleMediaHeader,
    DataInformation,
    DataReference,
    DataEntryUrl,
    DataEntryUrn,

    // Sample table
    SampleTable,
    SampleDescription,
    SampleEntry,
    VisualSampleEntry,
    AudioSampleEntry,
    BitRate,
    TimeToSample,
    CompositionOffset,
    CompositionToDecode,
    SyncSample,
    ShadowSyncSample,
    SampleDependencyType,
    DegradationPriority,
    SampleSize,
    CompactSampleSize,
    SampleToChunk,
    ChunkOffset,
    ChunkLargeOffset,
    PaddingBits,
    SubSampleInformation,
    SampleAuxiliaryInformationSizes,
    SampleAuxiliaryInformationOffsets,
    SampleToGroup,
    SampleGroupDescription,

    // Fragments
    MovieExtends,
    MovieExtendsHeader,
    TrackExtends,
    MovieFragment,
    MovieFragmentHeader,
    TrackFragment,
    TrackFragmentDecodeTime,
    MovieFragmentRandomAccess,
    MovieFragmentRandomAccessOffset,
    TrackExtensionProperties,

    // User data
    UserData,
    Copyright,
    TrackSelection,
    Kind,

    // Meta and items
    Meta,
    Xml,
    BinaryXml,
    ItemLocation,
    PrimaryItem,
    ItemProtection,
    ItemInfoEntry,
    ItemInfo,
    AdditionalMetadata,
    MetaboxRelation,
    ItemData,
    ItemReference,
    SingleItemReference,
    SingleItemReferenceLarge,
    ItemProperties,
    ItemPropertyContainer,
    ImageSpatialExtents,

    // Protection, restriction, sub tracks
    ProtectionSchemeInfo,
    OriginalFormat,
    SchemeType,
    SchemeInformation,
    RestrictedSchemeInfo,
    SubTrack,
    SubTrackDefinition,
    CompleteTrackInfo,

    /// Full box whose body is not decoded (track runs, fragment headers,
    /// segment indexes, ...). Only version and flags are exposed.
    Unparsed,
}

impl KnownBox {
    /// Does this box start with version and flags?
    pub fn is_full_box(&self) -> bool {
        use KnownBox::*;
        matches!(
            self,
            ProgressiveDownloadInfo
                | MovieHeader
                | TrackHeader
                | TrackGroupType
                | EditList
                | MediaHeader
                | Handler
                | ExtendedLanguage
                | VideoMediaHeader
                | SoundMediaHeader
                | HintMediaHeader
                | NullMediaHeader
                | SubtitleMediaHeader
                | DataReference
                | DataEntryUrl
                | DataEntryUrn
                | SampleDescription
                | TimeToSample
                | CompositionOffset
                | CompositionToDecode
                | SyncSample
                | ShadowSyncSample
                | SampleDependencyType
                | DegradationPriority
                | SampleSize
                | CompactSampleSize
                | SampleToChunk
                | ChunkOffset
                | ChunkLargeOffset
                | PaddingBits
                | SubSampleInformation
                | SampleAuxiliaryInformationSizes
                | SampleAuxiliaryInformationOffsets
                | SampleToGroup
                | SampleGroupDescription
                | MovieExtendsHeader
                | TrackExtends
                | MovieFragmentHeader
                | TrackFragmentDecodeTime
                | MovieFragmentRandomAccessOffset
                | TrackExtensionProperties
                | Copyright
                | TrackSelection
                | Kind
                | Meta
                | Xml
                | BinaryXml
                | ItemLocation
                | PrimaryItem
                | ItemProtection
                | ItemInfoEntry
                | ItemInfo
                | MetaboxRelation
                | ItemReference
                | ImageSpatialExtents
                | SchemeType
                | Unparsed
        )
    }

    /// Human-readable name for this kind.
    pub fn full_name(&self) -> &'static str {
        use KnownBox::*;
        match self {
            Generic => "Box",
            FileType => "File Type Box",
            MediaData => "Media Data Box",
            FreeSpace => "Free Space Box",
            ProgressiveDownloadInfo => "Progressive Download Information Box",
            Movie => "Movie Box",
            MovieHeader => "Movie Header Box",
            Track => "Track Box",
            TrackHeader => "Track Header Box",
            TrackReference => "Track Reference Box",
            TrackReferenceType => "Track Reference Type Box",
            TrackGroup => "Track Group Box",
            TrackGroupType => "Track Group Type Box",
            Edit => "Edit Box",
            EditList => "Edit List Box",
            Media => "Media Box",
            MediaHeader => "Media Header Box",
            Handler => "Handler Reference Box",
            ExtendedLanguage => "Extended Language Tag",
            MediaInformation => "Media Information Box",
            VideoMediaHeader => "Video Media Header Box",
            SoundMediaHeader => "Sound Media Header Box",
            HintMediaHeader => "Hint Media Header Box",
            NullMediaHeader => "Null Media Header Box",
            SubtitleMediaHeader => "Subtitle Media Header Box",
            DataInformation => "Data Information Box",
            DataReference => "Data Reference Box",
            DataEntryUrl => "Data Entry URL Box",
            DataEntryUrn => "Data Entry URN Box",
            SampleTable => "Sample Table Box",
            SampleDescription => "Sample Description Box",
            SampleEntry => "Sample Entry",
            VisualSampleEntry => "Visual Sample Entry",
            AudioSampleEntry => "Audio Sample Entry",
            BitRate => "Bit Rate Box",
            TimeToSample => "Decoding Time to Sample Box",
            CompositionOffset => "Composition Time to Sample Box",
            CompositionToDecode => "Composition to Decode Box",
            SyncSample => "Sync Sample Box",
            ShadowSyncSample => "Shadow Sync Sample Box",
            SampleDependencyType => "Independent and Disposable Samples Box",
            DegradationPriority => "Degradation Priority Box",
            SampleSize => "Sample Size Box",
            CompactSampleSize => "Compact Sample Size Box",
            SampleToChunk => "Sample To Chunk Box",
            ChunkOffset => "Chunk Offset Box",
            ChunkLargeOffset => "Chunk Large Offset Box",
            PaddingBits => "Padding Bits Box",
            SubSampleInformation => "Sub-Sample Information Box",
            SampleAuxiliaryInformationSizes => "Sample Auxiliary Information Sizes Box",
            SampleAuxiliaryInformationOffsets => "Sample Auxiliary Information Offsets Box",
            SampleToGroup => "Sample To Group Box",
            SampleGroupDescription => "Sample Group Description Box",
            MovieExtends => "Movie Extends Box",
            MovieExtendsHeader => "Movie Extends Header Box",
            TrackExtends => "Track Extends Box",
            MovieFragment => "Movie Fragment Box",
            MovieFragmentHeader => "Movie Fragment Header Box",
            TrackFragment => "Track Fragment Box",
            TrackFragmentDecodeTime => "Track Fragment Base Media Decode Time Box",
            MovieFragmentRandomAccess => "Movie Fragment Random Access Box",
            MovieFragmentRandomAccessOffset => "Movie Fragment Random Access Offset Box",
            TrackExtensionProperties => "Track Extension Properties Box",
            UserData => "User Data Box",
            Copyright => "Copyright Box",
            TrackSelection => "Track Selection Box",
            Kind => "Kind Box",
            Meta => "Meta Box",
            Xml => "XML Box",
            BinaryXml => "Binary XML Box",
            ItemLocation => "Item Location Box",
            PrimaryItem => "Primary Item Box",
            ItemProtection => "Item Protection Box",
            ItemInfoEntry => "Item Info Entry",
            ItemInfo => "Item Information Box",
            AdditionalMetadata => "Additional Metadata Container Box",
            MetaboxRelation => "Metabox Relation Box",
            ItemData => "Item Data Box",
            ItemReference => "Item Reference Box",
            SingleItemReference => "Single Item Type Reference Box",
            SingleItemReferenceLarge => "Single Item Type Reference Box Large",
            ItemProperties => "Item Properties Box",
            ItemPropertyContainer => "Item Property Container Box",
            ImageSpatialExtents => "Image Spatial Extents Property",
            ProtectionSchemeInfo => "Protection Scheme Information Box",
            OriginalFormat => "Original Format Box",
            SchemeType => "Scheme Type Box",
            SchemeInformation => "Scheme Information Box",
            RestrictedSchemeInfo => "Restricted Scheme Information Box",
            SubTrack => "Sub Track Box",
            SubTrackDefinition => "Sub Track Definition Box",
            CompleteTrackInfo => "Complete Track Information Box",
            Unparsed => "Full Box",
        }
    }

    /// Field schema of `bx`, which must be of this kind.
    pub(crate) fn layout(self, bx: &BoxRef) -> Result<Layout> {
        use KnownBox::*;
        use layout::*;
        Ok(match self {
            Generic | Movie | Track | Edit | Media | MediaInformation | DataInformation | SampleTable
            | MovieExtends | MovieFragment | TrackFragment | MovieFragmentRandomAccess | UserData | Meta
            | AdditionalMetadata | ItemProperties | ItemPropertyContainer | ProtectionSchemeInfo
            | SchemeInformation | RestrictedSchemeInfo | SubTrack | SubTrackDefinition | CompleteTrackInfo => {
                Layout::container()
            }

            FileType => file::file_type(),
            MediaData | FreeSpace => file::opaque_data(),
            ProgressiveDownloadInfo => file::progressive_download(),

            MovieHeader => movie::movie_header(bx)?,
            TrackHeader => track::track_header(bx)?,
            TrackReference => track::track_reference(),
            TrackReferenceType => track::track_reference_type(),
            TrackGroup => track::track_group(),
            TrackGroupType => track::track_group_type(),
            EditList => time::edit_list(bx)?,

            MediaHeader => media::media_header(bx)?,
            Handler => media::handler(),
            ExtendedLanguage => media::extended_language(),
            VideoMediaHeader => media::video_media_header(),
            SoundMediaHeader => media::sound_media_header(),
            HintMediaHeader => media::hint_media_header(),
            NullMediaHeader | SubtitleMediaHeader | Unparsed => media::empty_full(),
            DataReference => data::data_reference(bx)?,
            DataEntryUrl => data::data_entry_url(bx)?,
            DataEntryUrn => data::data_entry_urn(bx)?,

            SampleDescription => sample::sample_description(bx)?,
            SampleEntry => sample::sample_entry(),
            VisualSampleEntry => sample::visual_sample_entry(),
            AudioSampleEntry => sample::audio_sample_entry(bx)?,
            BitRate => sample::bit_rate(),
            TimeToSample => time::time_to_sample(bx)?,
            CompositionOffset => time::composition_offset(bx)?,
            CompositionToDecode => time::composition_to_decode(bx)?,
            SyncSample => time::sync_sample(bx)?,
            ShadowSyncSample => time::shadow_sync_sample(bx)?,
            SampleDependencyType => sample::sample_dependency_type(bx)?,
            DegradationPriority => sample::degradation_priority(bx)?,
            SampleSize => sample::sample_size(bx)?,
            CompactSampleSize => sample::compact_sample_size(bx)?,
            SampleToChunk => sample::sample_to_chunk(bx)?,
            ChunkOffset => sample::chunk_offset(bx)?,
            ChunkLargeOffset => sample::chunk_large_offset(bx)?,
            PaddingBits => sample::padding_bits(bx)?,
            SubSampleInformation => sample::sub_sample_information(bx)?,
            SampleAuxiliaryInformationSizes => sample::aux_info_sizes(bx)?,
            SampleAuxiliaryInformationOffsets => sample::aux_info_offsets(bx)?,
            SampleToGroup => group::sample_to_group(bx)?,
            SampleGroupDescription => group::sample_group_description(bx)?,

            MovieExtendsHeader => fragment::movie_extends_header(bx)?,
            TrackExtends => fragment::track_extends(),
            MovieFragmentHeader => fragment::movie_fragment_header(),
            TrackFragmentDecodeTime => fragment::decode_time(bx)?,
            MovieFragmentRandomAccessOffset => fragment::random_access_offset(),
            TrackExtensionProperties => fragment::extension_properties(),

            Copyright => user::copyright(),
            TrackSelection => user::track_selection(),
            Kind => user::kind(),

            Xml => meta::xml(),
            BinaryXml => meta::binary_xml(),
            ItemLocation => meta::item_location(bx)?,
            PrimaryItem => meta::primary_item(bx)?,
            ItemProtection => meta::item_protection(bx)?,
            ItemInfoEntry => meta::item_info_entry(bx)?,
            ItemInfo => meta::item_info(bx)?,
            MetaboxRelation => meta::metabox_relation(),
            ItemData => file::opaque_data(),
            ItemReference => meta::item_reference(bx)?,
            SingleItemReference => meta::single_item_reference(bx, false)?,
            SingleItemReferenceLarge => meta::single_item_reference(bx, true)?,
            ImageSpatialExtents => meta::image_spatial_extents(),

            OriginalFormat => protection::original_format(),
            SchemeType => protection::scheme_type(bx)?,
        })
    }
}
