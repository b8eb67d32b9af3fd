//! SD card storage adapter (SPI + embedded-sdmmc).
//!
//! Backs the persist sink's [`StoragePort`]. Files live in the card's
//! root directory with 8.3 names; the leading `/` of configured paths is
//! stripped. Mounting retries a few times — cards are slow to come up
//! after power-on — and a card that never mounts is a fatal startup
//! error for persist deployments.

use embedded_sdmmc::{Mode, SdCard, TimeSource, Timestamp, VolumeIdx, VolumeManager};
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::spi::SpiDeviceDriver;
use log::{info, warn};

use crate::app::ports::StoragePort;
use crate::error::{Error, StorageError};

const MOUNT_RETRIES: u32 = 10;

/// The node has no battery-backed RTC; file timestamps are fixed.
struct NoRtc;

impl TimeSource for NoRtc {
    fn get_timestamp(&self) -> Timestamp {
        Timestamp {
            year_since_1970: 0,
            zero_indexed_month: 0,
            zero_indexed_day: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }
}

type Card = SdCard<SpiDeviceDriver<'static, esp_idf_hal::spi::SpiDriver<'static>>, FreeRtos>;

pub struct SdStorage {
    volumes: VolumeManager<Card, NoRtc>,
}

impl SdStorage {
    /// Probe and mount the card. Retries before giving up; failure here
    /// halts persist-mode startup.
    pub fn mount(
        spi: SpiDeviceDriver<'static, esp_idf_hal::spi::SpiDriver<'static>>,
    ) -> Result<Self, Error> {
        let card = SdCard::new(spi, FreeRtos);

        let mut attempt = 0;
        loop {
            match card.num_bytes() {
                Ok(size) => {
                    info!("storage: card mounted, {} MiB", size / (1024 * 1024));
                    break;
                }
                Err(e) => {
                    attempt += 1;
                    if attempt > MOUNT_RETRIES {
                        warn!("storage: card mount failed after {MOUNT_RETRIES} retries: {e:?}");
                        return Err(Error::Storage(StorageError::MountFailed));
                    }
                    card.mark_card_uninit();
                    FreeRtos::delay_ms(100);
                }
            }
        }

        Ok(Self {
            volumes: VolumeManager::new(card, NoRtc),
        })
    }

    fn with_root<T>(
        &mut self,
        f: impl FnOnce(
            &mut embedded_sdmmc::RawDirectory,
            &mut VolumeManager<Card, NoRtc>,
        ) -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        let volume = self
            .volumes
            .open_raw_volume(VolumeIdx(0))
            .map_err(|_| StorageError::MountFailed)?;
        let mut root = self
            .volumes
            .open_root_dir(volume)
            .map_err(|_| StorageError::OpenFailed)?;

        let result = f(&mut root, &mut self.volumes);

        let _ = self.volumes.close_dir(root);
        let _ = self.volumes.close_volume(volume);
        result
    }
}

fn short_name(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}

impl StoragePort for SdStorage {
    fn exists(&mut self, path: &str) -> bool {
        let name = short_name(path).to_string();
        self.with_root(|root, volumes| {
            Ok(volumes.find_directory_entry(*root, &name).is_ok())
        })
        .unwrap_or(false)
    }

    fn append(&mut self, path: &str, data: &[u8]) -> Result<(), StorageError> {
        let name = short_name(path).to_string();
        self.with_root(|root, volumes| {
            let file = volumes
                .open_file_in_dir(*root, &name, Mode::ReadWriteCreateOrAppend)
                .map_err(|_| StorageError::OpenFailed)?;
            let result = volumes
                .write(file, data)
                .map_err(|_| StorageError::WriteFailed);
            volumes.close_file(file).map_err(|_| StorageError::IoError)?;
            result
        })
    }

    fn read_all(&mut self, path: &str) -> Result<Vec<u8>, StorageError> {
        let name = short_name(path).to_string();
        self.with_root(|root, volumes| {
            let file = volumes
                .open_file_in_dir(*root, &name, Mode::ReadOnly)
                .map_err(|_| StorageError::NotFound)?;
            let mut contents = Vec::new();
            let mut buf = [0u8; 512];
            loop {
                match volumes.read(file, &mut buf) {
                    Ok(0) => break,
                    Ok(n) => contents.extend_from_slice(&buf[..n]),
                    Err(_) => {
                        let _ = volumes.close_file(file);
                        return Err(StorageError::IoError);
                    }
                }
            }
            volumes.close_file(file).map_err(|_| StorageError::IoError)?;
            Ok(contents)
        })
    }

    fn remove(&mut self, path: &str) -> Result<(), StorageError> {
        let name = short_name(path).to_string();
        self.with_root(|root, volumes| {
            match volumes.delete_file_in_dir(*root, &name) {
                Ok(()) => Ok(()),
                // Deleting a missing file is not an error.
                Err(embedded_sdmmc::Error::NotFound) => Ok(()),
                Err(_) => Err(StorageError::IoError),
            }
        })
    }
}
