use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use platen_traits::raster::decode_raster;
use platen_traits::{BackendError, DocumentBackend, PixelFormat, ResourceId};
use std::collections::HashMap;
use std::path::Path;

/// A `DocumentBackend` that embeds resources as XObject streams in a
/// `lopdf::Document`.
///
/// Handles are minted sequentially and mapped to lopdf object ids; the
/// surrounding generator takes the finished document back with
/// [`into_document`](LopdfBackend::into_document) and wires the XObjects
/// into page resource dictionaries itself.
pub struct LopdfBackend {
    doc: Document,
    objects: HashMap<ResourceId, ObjectId>,
    next: i32,
}

impl LopdfBackend {
    pub fn new() -> Self {
        Self {
            doc: Document::with_version("1.7"),
            objects: HashMap::new(),
            next: 0,
        }
    }

    /// The lopdf object id behind a handle, if it is still embedded.
    pub fn object_id(&self, id: ResourceId) -> Option<ObjectId> {
        self.objects.get(&id).copied()
    }

    /// Hands the document back to the surrounding generator.
    pub fn into_document(self) -> Document {
        self.doc
    }

    fn mint(&mut self, object_id: ObjectId) -> ResourceId {
        let id = ResourceId::new(self.next);
        self.next += 1;
        self.objects.insert(id, object_id);
        id
    }
}

impl Default for LopdfBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentBackend for LopdfBackend {
    fn embed_image_file(
        &mut self,
        path: &Path,
        mask: Option<ResourceId>,
    ) -> Result<ResourceId, BackendError> {
        let fail = |message: String| BackendError::ImageEmbedFailed {
            path: path.display().to_string(),
            message,
        };

        let bytes = std::fs::read(path).map_err(|e| fail(e.to_string()))?;
        let view = decode_raster(&bytes).map_err(|e| fail(e.to_string()))?;

        let (color_space, content) = match view.format() {
            PixelFormat::Gray8 => ("DeviceGray", view.pixels().to_vec()),
            PixelFormat::Rgb24 => ("DeviceRGB", view.pixels().to_vec()),
            // PDF image streams carry no alpha channel; transparency goes
            // through the separate mask resource.
            PixelFormat::Rgba32 => (
                "DeviceRGB",
                view.pixels()
                    .chunks_exact(4)
                    .flat_map(|px| [px[0], px[1], px[2]])
                    .collect(),
            ),
        };

        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => view.width() as i64,
            "Height" => view.height() as i64,
            "ColorSpace" => color_space,
            "BitsPerComponent" => 8i64,
        };
        if let Some(mask) = mask {
            let mask_oid = self
                .object_id(mask)
                .ok_or_else(|| fail(format!("unknown mask handle {mask}")))?;
            dict.set("Mask", Object::Reference(mask_oid));
        }

        let object_id = self.doc.add_object(Stream::new(dict, content));
        let id = self.mint(object_id);
        log::debug!("embedded image {} as {id}", path.display());
        Ok(id)
    }

    fn embed_raw_mask(
        &mut self,
        bytes: &[u8],
        width: u32,
        height: u32,
        bits_per_component: u8,
    ) -> Result<ResourceId, BackendError> {
        let bytes_per_row = (width as usize * bits_per_component as usize).div_ceil(8);
        let expected = bytes_per_row * height as usize;
        if bytes.len() != expected {
            return Err(BackendError::MaskEmbedFailed {
                width,
                height,
                message: format!(
                    "mask payload is {} bytes, expected {expected} at {bits_per_component} bpc",
                    bytes.len()
                ),
            });
        }

        let dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ImageMask" => true,
            "BitsPerComponent" => bits_per_component as i64,
        };

        let object_id = self.doc.add_object(Stream::new(dict, bytes.to_vec()));
        let id = self.mint(object_id);
        log::debug!("embedded {width}x{height} mask as {id}");
        Ok(id)
    }

    fn release_resource(&mut self, id: ResourceId) {
        match self.objects.remove(&id) {
            Some(object_id) => {
                self.doc.objects.remove(&object_id);
            }
            None => log::warn!("release of unknown resource {id}"),
        }
    }
}
