use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local};
use tokio::task;
use tracing::{debug, info, warn};

use crate::{
    audio::{AudioLoader, AudioTimelineMixer, AudioWriter, NarrationClip},
    composition::compositor::FrameCompositor,
    composition::job::{FactSelector, JobManifest, Offer, SelectedFact},
    config::Config,
    error::{CompositionError, CompositorError, Result, VideoError},
    overlay::TextRenderer,
    timing::{Timeline, WordTimingEstimator},
    video::{BackgroundAnimator, BackgroundImage, EncodedVideo, FfmpegEncoder, ImageLoader, ThumbnailGenerator},
};

/// Summary of a finished composition
#[derive(Debug, Clone)]
pub struct CompositionReport {
    pub video_path: PathBuf,
    pub audio_path: PathBuf,
    pub thumbnail_path: Option<PathBuf>,
    pub fact_count: usize,
    pub total_duration: f64,
    pub frame_count: usize,
    pub file_size: u64,
    pub created_at: DateTime<Local>,
}

/// Backgrounds ready for the animator, and whether they came from real images
struct PreparedBackground {
    animator: BackgroundAnimator,
    from_images: bool,
}

/// Main composition engine that orchestrates the entire short video pipeline
///
/// The engine follows a clear pipeline:
/// 1. Narration - Load narration, select facts up to the target duration
/// 2. Timeline - Lay segments out back to back and estimate word timings
/// 3. Audio - Mix ambient bed, narration and cue tones, export WAV
/// 4. Backgrounds - Ingest stills (or gradients) into the animator
/// 5. Video - Render frames in parallel and stream them to the encoder
/// 6. Thumbnail - Compose the still preview
pub struct CompositionEngine {
    config: Config,
    write_thumbnail: bool,
}

impl CompositionEngine {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            write_thumbnail: true,
        }
    }

    /// Skip step 6
    pub fn without_thumbnail(mut self) -> Self {
        self.write_thumbnail = false;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Main composition method - orchestrates the entire pipeline
    ///
    /// Artifacts are written to `output_dir`: `audio/mix.wav`, `short.mp4`
    /// and `thumbnail.jpg`.
    pub async fn compose<P: AsRef<Path>>(&self, job: &JobManifest, output_dir: P) -> Result<CompositionReport> {
        let output_dir = output_dir.as_ref();

        info!("🎬 Starting Shorts-Compositor composition");
        info!("   Facts offered: {}", job.facts.len());
        info!("   Images: {:?}", job.images_dir());
        info!("   Output: {:?}", output_dir);

        tokio::fs::create_dir_all(output_dir.join("audio")).await?;

        // Pipeline Step 1: Narration and fact selection
        let facts = self.select_facts(job).await?;

        // Pipeline Step 2: Timeline
        let timeline = self.build_timeline(&facts);

        // Pipeline Step 3: Audio mix
        let audio_path = self.mix_audio(&facts, &timeline, output_dir).await?;

        // Pipeline Step 4: Backgrounds
        let background = self.prepare_background(job, timeline.total_duration()).await?;
        let from_images = background.from_images;

        let compositor = Arc::new(FrameCompositor::new(
            self.config.canvas,
            self.config.overlay.clone(),
            timeline,
            background.animator,
            TextRenderer::load(&self.config.overlay.font_paths),
        ));

        // Pipeline Step 5: Render and encode
        let video_path = output_dir.join("short.mp4");
        let encoded = self.render_video(Arc::clone(&compositor), &audio_path, &video_path).await?;

        // Pipeline Step 6: Thumbnail
        let thumbnail_path = if self.write_thumbnail {
            let texts: Vec<String> = facts.iter().map(|f| f.text.clone()).collect();
            Some(self.generate_thumbnail(Arc::clone(&compositor), from_images, texts, output_dir).await?)
        } else {
            None
        };

        let report = CompositionReport {
            video_path: encoded.path,
            audio_path,
            thumbnail_path,
            fact_count: facts.len(),
            total_duration: compositor.timeline().total_duration(),
            frame_count: encoded.frame_count,
            file_size: encoded.file_size,
            created_at: Local::now(),
        };

        info!("🎉 Composition complete! Output saved to: {:?}", report.video_path);
        Ok(report)
    }

    /// Steps 1, 2 and 4 only: a compositor ready to render single frames
    pub async fn prepare(&self, job: &JobManifest) -> Result<(Vec<SelectedFact>, FrameCompositor)> {
        let facts = self.select_facts(job).await?;
        let timeline = self.build_timeline(&facts);
        let background = self.prepare_background(job, timeline.total_duration()).await?;

        let compositor = FrameCompositor::new(
            self.config.canvas,
            self.config.overlay.clone(),
            timeline,
            background.animator,
            TextRenderer::load(&self.config.overlay.font_paths),
        );
        Ok((facts, compositor))
    }

    // ==========================================
    // PIPELINE STEP 1: NARRATION
    // ==========================================

    /// Load narration for each offered fact until the target duration is met
    async fn select_facts(&self, job: &JobManifest) -> Result<Vec<SelectedFact>> {
        info!("🗣️  Step 1: Loading narration and selecting facts...");

        let mut selector = FactSelector::new(self.config.selection.clone());

        for (index, fact) in job.facts.iter().enumerate() {
            if selector.is_complete() {
                debug!("Target of {:.0}s reached, ignoring remaining facts", self.config.selection.target_total);
                break;
            }
            if selector.is_duplicate(&fact.text) {
                debug!("Fact {} repeats an earlier one, skipping", index + 1);
                continue;
            }

            let path = job.narration_path(fact);
            let audio = match AudioLoader::load(&path).await {
                Ok(audio) => audio,
                Err(e) if e.is_recoverable() => {
                    warn!("Skipping fact {}: {}", index + 1, e);
                    continue;
                }
                Err(e) => return Err(e),
            };

            let clip = NarrationClip::prepare(&audio, &self.config.audio);
            match selector.offer(&fact.text, clip) {
                Offer::Accepted => {
                    let preview: String = fact.text.chars().take(60).collect();
                    info!("   [{}] {:.1}s  {}", selector.len(), selector.total(), preview);
                }
                outcome => debug!("Fact {} not used: {:?}", index + 1, outcome),
            }
        }

        if selector.is_empty() {
            return Err(CompositionError::NoFacts {
                reason: format!("none of the {} offered facts had usable narration", job.facts.len()),
            }
            .into());
        }

        info!("   ✅ {} facts | {:.1}s", selector.len(), selector.total());
        Ok(selector.into_selected())
    }

    // ==========================================
    // PIPELINE STEP 2: TIMELINE
    // ==========================================

    fn build_timeline(&self, facts: &[SelectedFact]) -> Timeline {
        info!("⏱️  Step 2: Building timeline...");

        let estimator = WordTimingEstimator::new(self.config.timing.clone());
        let entries: Vec<(&str, f64)> = facts.iter().map(|f| (f.text.as_str(), f.duration())).collect();
        let timeline = Timeline::build(&entries, &estimator, 0.0);

        for segment in timeline.segments() {
            debug!(
                "      {:>6.2}s +{:.2}s  {} words",
                segment.start_offset,
                segment.duration,
                segment.words.len()
            );
        }
        info!("   ✅ {} segments, {:.1}s total", timeline.len(), timeline.total_duration());
        timeline
    }

    // ==========================================
    // PIPELINE STEP 3: AUDIO
    // ==========================================

    async fn mix_audio(&self, facts: &[SelectedFact], timeline: &Timeline, output_dir: &Path) -> Result<PathBuf> {
        info!("🎵 Step 3: Mixing audio...");

        let mixer = AudioTimelineMixer::new(self.config.audio.clone());
        let clips: Vec<(f64, &NarrationClip)> = timeline
            .segments()
            .iter()
            .zip(facts)
            .map(|(segment, fact)| (segment.start_offset, &fact.narration))
            .collect();
        let mix = mixer.mix(timeline.total_duration(), &clips);

        let path = output_dir.join("audio").join("mix.wav");
        let target = path.clone();
        task::spawn_blocking(move || AudioWriter::write_wav(&mix, &target))
            .await
            .map_err(|e| CompositorError::generic(format!("audio export task failed: {}", e)))??;

        info!("   ✅ Audio mixed: {:?}", path);
        Ok(path)
    }

    // ==========================================
    // PIPELINE STEP 4: BACKGROUNDS
    // ==========================================

    async fn prepare_background(&self, job: &JobManifest, total_duration: f64) -> Result<PreparedBackground> {
        info!("🖼️  Step 4: Preparing backgrounds...");

        let needed = self.config.background.needed_images(total_duration);
        let images = match job.images_dir() {
            Some(dir) => {
                let loader = ImageLoader::new(self.config.canvas, &self.config.background);
                let loaded = task::spawn_blocking(move || loader.load_dir(&dir, needed))
                    .await
                    .map_err(|e| CompositorError::generic(format!("image loading task failed: {}", e)))?;
                match loaded {
                    Ok(images) => images,
                    Err(e) => {
                        warn!("Could not read background images: {}", e);
                        Vec::new()
                    }
                }
            }
            None => Vec::new(),
        };

        let from_images = !images.is_empty();
        let animator = BackgroundAnimator::new(images, total_duration, self.config.canvas, &self.config.background);

        info!("   ✅ {} background clips ({} needed)", animator.clip_count(), needed);
        Ok(PreparedBackground { animator, from_images })
    }

    // ==========================================
    // PIPELINE STEP 5: RENDER AND ENCODE
    // ==========================================

    async fn render_video(
        &self,
        compositor: Arc<FrameCompositor>,
        audio_path: &Path,
        video_path: &Path,
    ) -> Result<EncodedVideo> {
        info!("🎞️  Step 5: Rendering and encoding video...");

        let encoder = FfmpegEncoder::new(self.config.encoder.clone(), self.config.canvas);
        if !encoder.check_ffmpeg_available() {
            return Err(VideoError::EncodingFailed {
                reason: format!("{} not found on PATH", self.config.encoder.ffmpeg),
            }
            .into());
        }

        let render = self.config.render.clone();
        let audio_path = audio_path.to_path_buf();
        let video_path = video_path.to_path_buf();

        let encoded = task::spawn_blocking(move || -> Result<EncodedVideo> {
            let mut session = encoder.start(&audio_path, &video_path)?;
            compositor.render_sequence(&mut session, &render)?;
            session.finish()
        })
        .await
        .map_err(|e| VideoError::EncodingFailed {
            reason: format!("render task failed: {}", e),
        })??;

        info!("   ✅ Video: {:?} ({} frames)", encoded.path, encoded.frame_count);
        Ok(encoded)
    }

    // ==========================================
    // PIPELINE STEP 6: THUMBNAIL
    // ==========================================

    async fn generate_thumbnail(
        &self,
        compositor: Arc<FrameCompositor>,
        from_images: bool,
        facts: Vec<String>,
        output_dir: &Path,
    ) -> Result<PathBuf> {
        info!("🖌️  Step 6: Generating thumbnail...");

        let generator = ThumbnailGenerator::new(self.config.canvas, self.config.overlay.clone());
        let path = output_dir.join("thumbnail.jpg");
        let target = path.clone();

        task::spawn_blocking(move || {
            let candidates: &[BackgroundImage] = if from_images {
                compositor.background().images()
            } else {
                &[]
            };
            generator.generate(candidates, &facts, compositor.text(), &target)
        })
        .await
        .map_err(|e| CompositorError::generic(format!("thumbnail task failed: {}", e)))??;

        info!("   ✅ Thumbnail: {:?}", path);
        Ok(path)
    }
}
