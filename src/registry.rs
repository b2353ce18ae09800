use crate::boxes::FourCC;
use crate::error::{ParseError, Result};
use crate::known_boxes::KnownBox;
use std::collections::HashMap;

/// Maps four-character codes to the kind that parses them.
///
/// Built once, then shared read-only by every scan that uses it. Use
/// [`BoxRegistry::iso`] for the standard table and the builder methods to
/// extend it.
#[derive(Debug, Clone)]
pub struct BoxRegistry {
    map: HashMap<FourCC, KnownBox>,
}

impl BoxRegistry {
    /// Create an empty registry. Every code resolves to the generic box.
    pub fn new() -> Self {
        Self { map: HashMap::new() }
    }

    /// The boxes of ISO/IEC 14496-12 plus common sample entries and item properties.
    pub fn iso() -> Self {
        Self {
            map: ISO_BOXES.iter().map(|(code, kind)| (FourCC(**code), *kind)).collect(),
        }
    }

    /// Adds a code. A code may only be registered once.
    pub fn register(&mut self, code: FourCC, kind: KnownBox) -> Result<()> {
        if self.map.contains_key(&code) {
            return Err(ParseError::RegistrationConflict { key: code.as_str_lossy() });
        }
        self.map.insert(code, kind);
        Ok(())
    }

    /// Return a new registry with the given code added.
    pub fn with_box(mut self, code: impl Into<FourCC>, kind: KnownBox) -> Result<Self> {
        self.register(code.into(), kind)?;
        Ok(self)
    }

    pub fn get(&self, code: FourCC) -> Option<KnownBox> {
        self.map.get(&code).copied()
    }

    /// Kind for `code`, or the generic box when unregistered.
    pub fn resolve(&self, code: FourCC) -> KnownBox {
        self.get(code).unwrap_or_else(|| {
            log::trace!("no kind registered for '{code}', using the generic box");
            KnownBox::Generic
        })
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FourCC, KnownBox)> + '_ {
        self.map.iter().map(|(c, k)| (*c, *k))
    }
}

impl Default for BoxRegistry {
    fn default() -> Self {
        Self::iso()
    }
}

pub fn default_registry() -> BoxRegistry {
    BoxRegistry::iso()
}

pub(crate) const ISO_BOXES: &[(&[u8; 4], KnownBox)] = &[
    // File-level
    (b"ftyp", KnownBox::FileType),
    (b"styp", KnownBox::FileType),
    (b"mdat", KnownBox::MediaData),
    (b"free", KnownBox::FreeSpace),
    (b"skip", KnownBox::FreeSpace),
    (b"pdin", KnownBox::ProgressiveDownloadInfo),

    // Movie and track structure
    (b"moov", KnownBox::Movie),
    (b"mvhd", KnownBox::MovieHeader),
    (b"trak", KnownBox::Track),
    (b"tkhd", KnownBox::TrackHeader),
    (b"tref", KnownBox::TrackReference),
    (b"hint", KnownBox::TrackReferenceType),
    (b"cdsc", KnownBox::TrackReferenceType),
    (b"font", KnownBox::TrackReferenceType),
    (b"hind", KnownBox::TrackReferenceType),
    (b"vdep", KnownBox::TrackReferenceType),
    (b"vplx", KnownBox::TrackReferenceType),
    (b"subt", KnownBox::TrackReferenceType),
    (b"trgr", KnownBox::TrackGroup),
    (b"msrc", KnownBox::TrackGroupType),
    (b"edts", KnownBox::Edit),
    (b"elst", KnownBox::EditList),

    // Media
    (b"mdia", KnownBox::Media),
    (b"mdhd", KnownBox::MediaHeader),
    (b"hdlr", KnownBox::Handler),
    (b"elng", KnownBox::ExtendedLanguage),
    (b"minf", KnownBox::MediaInformation),
    (b"vmhd", KnownBox::VideoMediaHeader),
    (b"smhd", KnownBox::SoundMediaHeader),
    (b"hmhd", KnownBox::HintMediaHeader),
    (b"nmhd", KnownBox::NullMediaHeader),
    (b"sthd", KnownBox::SubtitleMediaHeader),
    (b"dinf", KnownBox::DataInformation),
    (b"dref", KnownBox::DataReference),
    (b"url ", KnownBox::DataEntryUrl),
    (b"urn ", KnownBox::DataEntryUrn),

    // Sample table
    (b"stbl", KnownBox::SampleTable),
    (b"stsd", KnownBox::SampleDescription),
    (b"btrt", KnownBox::BitRate),
    (b"stts", KnownBox::TimeToSample),
    (b"ctts", KnownBox::CompositionOffset),
    (b"cslg", KnownBox::CompositionToDecode),
    (b"stss", KnownBox::SyncSample),
    (b"stsh", KnownBox::ShadowSyncSample),
    (b"sdtp", KnownBox::SampleDependencyType),
    (b"stdp", KnownBox::DegradationPriority),
    (b"stsz", KnownBox::SampleSize),
    (b"stz2", KnownBox::CompactSampleSize),
    (b"stsc", KnownBox::SampleToChunk),
    (b"stco", KnownBox::ChunkOffset),
    (b"co64", KnownBox::ChunkLargeOffset),
    (b"padb", KnownBox::PaddingBits),
    (b"subs", KnownBox::SubSampleInformation),
    (b"saiz", KnownBox::SampleAuxiliaryInformationSizes),
    (b"saio", KnownBox::SampleAuxiliaryInformationOffsets),
    (b"sbgp", KnownBox::SampleToGroup),
    (b"sgpd", KnownBox::SampleGroupDescription),

    // Sample entries (video)
    (b"avc1", KnownBox::VisualSampleEntry),
    (b"avc2", KnownBox::VisualSampleEntry),
    (b"avc3", KnownBox::VisualSampleEntry),
    (b"avc4", KnownBox::VisualSampleEntry),
    (b"hev1", KnownBox::VisualSampleEntry),
    (b"hvc1", KnownBox::VisualSampleEntry),
    (b"vvc1", KnownBox::VisualSampleEntry),
    (b"vvi1", KnownBox::VisualSampleEntry),
    (b"mp4v", KnownBox::VisualSampleEntry),
    (b"s263", KnownBox::VisualSampleEntry),
    (b"vp08", KnownBox::VisualSampleEntry),
    (b"vp09", KnownBox::VisualSampleEntry),
    (b"av01", KnownBox::VisualSampleEntry),
    (b"dvh1", KnownBox::VisualSampleEntry),
    (b"dvhe", KnownBox::VisualSampleEntry),
    (b"encv", KnownBox::VisualSampleEntry),
    (b"resv", KnownBox::VisualSampleEntry),
    (b"icpv", KnownBox::VisualSampleEntry),

    // Sample entries (audio)
    (b"mp4a", KnownBox::AudioSampleEntry),
    (b"ac-3", KnownBox::AudioSampleEntry),
    (b"ec-3", KnownBox::AudioSampleEntry),
    (b"ac-4", KnownBox::AudioSampleEntry),
    (b"Opus", KnownBox::AudioSampleEntry),
    (b"fLaC", KnownBox::AudioSampleEntry),
    (b"alac", KnownBox::AudioSampleEntry),
    (b"samr", KnownBox::AudioSampleEntry),
    (b"sawb", KnownBox::AudioSampleEntry),
    (b"mha1", KnownBox::AudioSampleEntry),
    (b"enca", KnownBox::AudioSampleEntry),

    // Fragments
    (b"mvex", KnownBox::MovieExtends),
    (b"mehd", KnownBox::MovieExtendsHeader),
    (b"trex", KnownBox::TrackExtends),
    (b"moof", KnownBox::MovieFragment),
    (b"mfhd", KnownBox::MovieFragmentHeader),
    (b"traf", KnownBox::TrackFragment),
    (b"tfdt", KnownBox::TrackFragmentDecodeTime),
    (b"mfra", KnownBox::MovieFragmentRandomAccess),
    (b"mfro", KnownBox::MovieFragmentRandomAccessOffset),
    (b"trep", KnownBox::TrackExtensionProperties),

    // User data
    (b"udta", KnownBox::UserData),
    (b"cprt", KnownBox::Copyright),
    (b"tsel", KnownBox::TrackSelection),
    (b"kind", KnownBox::Kind),

    // Meta and items
    (b"meta", KnownBox::Meta),
    (b"xml ", KnownBox::Xml),
    (b"bxml", KnownBox::BinaryXml),
    (b"iloc", KnownBox::ItemLocation),
    (b"pitm", KnownBox::PrimaryItem),
    (b"ipro", KnownBox::ItemProtection),
    (b"infe", KnownBox::ItemInfoEntry),
    (b"iinf", KnownBox::ItemInfo),
    (b"meco", KnownBox::AdditionalMetadata),
    (b"mere", KnownBox::MetaboxRelation),
    (b"idat", KnownBox::ItemData),
    (b"iref", KnownBox::ItemReference),
    (b"iprp", KnownBox::ItemProperties),
    (b"ipco", KnownBox::ItemPropertyContainer),
    (b"ispe", KnownBox::ImageSpatialExtents),

    // Protection, restriction, sub tracks
    (b"sinf", KnownBox::ProtectionSchemeInfo),
    (b"frma", KnownBox::OriginalFormat),
    (b"schm", KnownBox::SchemeType),
    (b"schi", KnownBox::SchemeInformation),
    (b"rinf", KnownBox::RestrictedSchemeInfo),
    (b"strk", KnownBox::SubTrack),
    (b"strd", KnownBox::SubTrackDefinition),
    (b"cinf", KnownBox::CompleteTrackInfo),

    // Not decoded beyond version and flags
    (b"tfhd", KnownBox::Unparsed),
    (b"trun", KnownBox::Unparsed),
    (b"tfra", KnownBox::Unparsed),
    (b"sidx", KnownBox::Unparsed),
    (b"ssix", KnownBox::Unparsed),
    (b"prft", KnownBox::Unparsed),
    (b"leva", KnownBox::Unparsed),
    (b"assp", KnownBox::Unparsed),
    (b"stvi", KnownBox::Unparsed),
    (b"stri", KnownBox::Unparsed),
    (b"stsg", KnownBox::Unparsed),
];
