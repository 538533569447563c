// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply delivery with audio-first fallback and the image side-channel.
//!
//! The fallback chain is exception-safe end-to-end: any failure in
//! synthesis or the audio send deletes the partially created asset
//! best-effort and retries the same message as plain text.

use std::sync::Arc;
use std::time::Duration;

use autolote_core::{
    AutoloteError, MessagingChannel, SpeechSynthesizer, TaskRegistry, Tone, Vehicle,
};
use tracing::{debug, warn};

/// Maximum images sent per vehicle.
const MAX_IMAGES_PER_VEHICLE: usize = 3;

/// How a reply ended up being delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveredAs {
    Audio,
    Text,
}

/// Per-delivery options.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeliveryOptions {
    /// Request audio delivery; ignored when audio is globally disabled.
    pub as_audio: bool,
    /// Prosody preset; classified from the text when absent.
    pub tone: Option<Tone>,
}

/// Delivers replies to the user through the messaging channel.
///
/// Clones share the channel, voice renderer, and task registry.
#[derive(Clone)]
pub struct Dispatcher {
    channel: Arc<dyn MessagingChannel>,
    voice: Option<Arc<dyn SpeechSynthesizer>>,
    audio_enabled: bool,
    cleanup_delay: Duration,
    image_pause: Duration,
    tasks: TaskRegistry,
}

impl Dispatcher {
    pub fn new(
        channel: Arc<dyn MessagingChannel>,
        voice: Option<Arc<dyn SpeechSynthesizer>>,
        audio_enabled: bool,
        cleanup_delay: Duration,
        tasks: TaskRegistry,
    ) -> Self {
        Self {
            channel,
            voice,
            audio_enabled,
            cleanup_delay,
            image_pause: Duration::from_secs(2),
            tasks,
        }
    }

    /// Override the pause between consecutive image sends.
    pub fn with_image_pause(mut self, pause: Duration) -> Self {
        self.image_pause = pause;
        self
    }

    /// Deliver `text` to `to`, as audio with text fallback when requested
    /// and globally enabled, otherwise as plain text.
    pub async fn deliver(
        &self,
        to: &str,
        text: &str,
        options: DeliveryOptions,
    ) -> Result<DeliveredAs, AutoloteError> {
        if self.audio_enabled
            && options.as_audio
            && let Some(voice) = &self.voice
        {
            let tone = options.tone.unwrap_or_else(|| voice.classify_tone(text));

            match voice.synthesize(text, tone).await {
                Ok(asset) => match self.channel.send_audio_url(to, &asset.public_url).await {
                    Ok(()) => {
                        self.schedule_asset_deletion(asset.object_name, self.cleanup_delay);
                        debug!(to, "reply delivered as audio");
                        return Ok(DeliveredAs::Audio);
                    }
                    Err(e) => {
                        warn!(to, error = %e, "audio send failed, falling back to text");
                        // The asset is unreferenced once the send failed.
                        self.schedule_asset_deletion(asset.object_name, Duration::ZERO);
                    }
                },
                Err(e) => {
                    warn!(to, error = %e, "voice synthesis failed, falling back to text");
                }
            }
        }

        self.channel.send_text(to, text).await?;
        debug!(to, "reply delivered as text");
        Ok(DeliveredAs::Text)
    }

    /// Send up to [`MAX_IMAGES_PER_VEHICLE`] captioned images of a vehicle.
    ///
    /// Returns the number of images successfully sent. Per-image failures
    /// are logged and skipped.
    pub async fn send_vehicle_images(
        &self,
        to: &str,
        vehicle: &Vehicle,
    ) -> Result<usize, AutoloteError> {
        if vehicle.images.is_empty() {
            return Ok(0);
        }

        let to_send: Vec<&String> =
            vehicle.images.iter().take(MAX_IMAGES_PER_VEHICLE).collect();
        let total = to_send.len();
        let mut sent = 0usize;

        for (index, image_url) in to_send.into_iter().enumerate() {
            let caption = image_caption(vehicle, index + 1, total);
            match self.channel.send_image_url(to, image_url, &caption).await {
                Ok(()) => sent += 1,
                Err(e) => warn!(to, image_url, error = %e, "image send failed"),
            }
            if index + 1 < total {
                tokio::time::sleep(self.image_pause).await;
            }
        }

        debug!(to, sent, total, vehicle = %vehicle.reference, "vehicle images dispatched");
        Ok(sent)
    }

    fn schedule_asset_deletion(&self, object_name: String, delay: Duration) {
        let Some(voice) = self.voice.clone() else {
            return;
        };
        self.tasks.spawn_after(delay, async move {
            if let Err(e) = voice.delete_asset(&object_name).await {
                warn!(object = %object_name, error = %e, "scheduled asset deletion failed");
            }
        });
    }
}

/// Caption for the nth image of a vehicle, mirroring the lot's listing
/// style: headline, view label, reference, price, location, counter.
fn image_caption(vehicle: &Vehicle, image_number: usize, total_images: usize) -> String {
    let mut caption = format!("📸 {} {}", vehicle.brand, vehicle.model);
    if let Some(year) = &vehicle.year {
        caption.push(' ');
        caption.push_str(year);
    }

    match image_number {
        1 => {
            caption.push_str(" - Vista exterior");
            if let Some(color) = &vehicle.color {
                caption.push_str(&format!(" (Color {color})"));
            }
        }
        2 => {
            caption.push_str(" - Interior");
            if let Some(transmission) = &vehicle.transmission {
                caption.push_str(&format!(" ({transmission})"));
            }
        }
        3 => {
            caption.push_str(" - Motor");
            if let Some(engine) = &vehicle.engine {
                caption.push_str(&format!(" ({engine})"));
            }
        }
        _ => {}
    }

    caption.push_str(&format!("\n🏷️ Ref: {}", vehicle.reference));
    if let Some(price) = &vehicle.price {
        caption.push_str(&format!("\n💰 ${price}"));
    }
    if let Some(location) = &vehicle.location {
        caption.push_str(&format!("\n📍 {location}"));
    }
    caption.push_str(&format!("\n\n({image_number}/{total_images})"));
    caption
}
