//! `GpuUploadSink` — the boundary to whatever actually owns the pool data
//! texture and metadata texture.
//!
//! This system is explicit about not specifying real GPU shader/texture
//! binding code (the domain this exists to decouple from); grounded on the
//! optional-feature pattern `src/render/context.rs` uses for its own GPU
//! extras, `gpu_sink` gives every test and the headless demo client a real,
//! exercised implementation ([`MemoryPoolTarget`]) while the `gpu` feature
//! adds a second, real-device implementation on top of the same trait.

use crate::core::error::Error;

/// Where uploaded brick bytes and metadata texels actually land. One slot
/// write per completed brick, one texel write per status change.
pub trait GpuUploadSink: Send + Sync {
    fn upload_brick(&self, slot_index: u32, bytes: &[u8]) -> Result<(), Error>;
    fn upload_metadata_texel(&self, brick_id: u32, encoded_status: u32) -> Result<(), Error>;
}

/// A plain CPU-side pool, standing in for the GPU texture in tests and the
/// headless demo client. Slot `i`'s bytes live at `slots[i]`.
pub struct MemoryPoolTarget {
    slots: std::sync::Mutex<Vec<Vec<u8>>>,
    metadata_texels: std::sync::Mutex<Vec<u32>>,
}

impl MemoryPoolTarget {
    pub fn new(slot_count: usize, brick_count: usize) -> Self {
        Self {
            slots: std::sync::Mutex::new(vec![Vec::new(); slot_count]),
            metadata_texels: std::sync::Mutex::new(vec![0; brick_count]),
        }
    }

    pub fn slot_bytes(&self, slot_index: u32) -> Vec<u8> {
        self.slots.lock().expect("pool target poisoned")[slot_index as usize].clone()
    }

    pub fn metadata_texel(&self, brick_id: u32) -> u32 {
        self.metadata_texels.lock().expect("pool target poisoned")[brick_id as usize]
    }
}

impl GpuUploadSink for MemoryPoolTarget {
    fn upload_brick(&self, slot_index: u32, bytes: &[u8]) -> Result<(), Error> {
        self.slots.lock().expect("pool target poisoned")[slot_index as usize] = bytes.to_vec();
        Ok(())
    }

    fn upload_metadata_texel(&self, brick_id: u32, encoded_status: u32) -> Result<(), Error> {
        self.metadata_texels.lock().expect("pool target poisoned")[brick_id as usize] = encoded_status;
        Ok(())
    }
}

#[cfg(feature = "gpu")]
pub mod wgpu_target {
    //! A real `wgpu::Texture`-backed sink. Not exercised by default-feature
    //! tests; covered by the `gpu` feature's own integration surface.
    use super::*;

    pub struct WgpuPoolTarget {
        queue: wgpu::Queue,
        pool_texture: wgpu::Texture,
        metadata_texture: wgpu::Texture,
        brick_bytes: [u32; 3],
    }

    impl WgpuPoolTarget {
        pub fn new(
            queue: wgpu::Queue,
            pool_texture: wgpu::Texture,
            metadata_texture: wgpu::Texture,
            brick_bytes: [u32; 3],
        ) -> Self {
            Self { queue, pool_texture, metadata_texture, brick_bytes }
        }
    }

    impl GpuUploadSink for WgpuPoolTarget {
        fn upload_brick(&self, slot_index: u32, bytes: &[u8]) -> Result<(), Error> {
            let [bx, by, bz] = self.brick_bytes;
            let slots_per_row = (self.pool_texture.width() / bx).max(1);
            let origin_x = (slot_index % slots_per_row) * bx;
            let origin_y = ((slot_index / slots_per_row) % (self.pool_texture.height() / by).max(1)) * by;
            let origin_z = (slot_index / slots_per_row / (self.pool_texture.height() / by).max(1)) * bz;
            self.queue.write_texture(
                wgpu::ImageCopyTexture {
                    texture: &self.pool_texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d { x: origin_x, y: origin_y, z: origin_z },
                    aspect: wgpu::TextureAspect::All,
                },
                bytes,
                wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(bx),
                    rows_per_image: Some(by),
                },
                wgpu::Extent3d { width: bx, height: by, depth_or_array_layers: bz },
            );
            Ok(())
        }

        fn upload_metadata_texel(&self, brick_id: u32, encoded_status: u32) -> Result<(), Error> {
            let width = self.metadata_texture.width().max(1);
            let height = self.metadata_texture.height().max(1);
            let x = brick_id % width;
            let y = (brick_id / width) % height;
            let z = brick_id / width / height;
            self.queue.write_texture(
                wgpu::ImageCopyTexture {
                    texture: &self.metadata_texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d { x, y, z },
                    aspect: wgpu::TextureAspect::All,
                },
                bytemuck::bytes_of(&encoded_status),
                wgpu::ImageDataLayout { offset: 0, bytes_per_row: Some(4), rows_per_image: Some(1) },
                wgpu::Extent3d { width: 1, height: 1, depth_or_array_layers: 1 },
            );
            Ok(())
        }
    }
}
