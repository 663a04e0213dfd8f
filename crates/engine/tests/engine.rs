mod support;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use clipweave_animation::{Channel, TrackTarget};
use clipweave_engine::{AnimationPatch, MemoryResolver, PlaybackState};
use clipweave_project_model::{
    Animation, AnimationKind, AudioProperties, Effect, Element, ElementId, ElementPatch,
    ElementProperties, ExportFormat, ImageProperties, MathPlotProperties, MediaKind, MediaRef,
    Placement, ProjectDocument, ProjectSettings, SlideDirection, SlideProperties, TimeFrame,
    VideoProperties,
};
use clipweave_render_engine::{
    DecodedMedia, ExportStage, HeadlessDecoder, ManifestEncoder, ProgressCallback, VisualHandle,
    VisualTransform,
};
use proptest::prelude::*;

use support::{harness, harness_with, Harness};

fn title(text: &str, frame: TimeFrame) -> Element {
    Element::text("Title", text, 40.0, 700, frame)
}

fn visible_on_surface(h: &Harness, id: &ElementId) -> bool {
    let handle = h.engine.synchronizer().handle_for(id).unwrap();
    let surface = h.surface.lock();
    surface.visual(handle).unwrap().state.unwrap().visible
}

#[tokio::test]
async fn text_is_visible_only_inside_its_frame() {
    let mut h = harness();
    let id = h.engine.add(title("Hello", TimeFrame::new(0.0, 5000.0))).await;

    h.engine.handle_seek(6000.0);
    assert!(!h.engine.visible_ids().contains(&id));
    assert!(!visible_on_surface(&h, &id));

    h.engine.handle_seek(2000.0);
    assert_eq!(h.engine.visible_ids(), vec![id.clone()]);
    assert!(visible_on_surface(&h, &id));
}

#[tokio::test]
async fn fade_in_is_sampled_at_the_playhead() {
    let mut h = harness();
    let id = h.engine.add(title("Hello", TimeFrame::new(0.0, 5000.0))).await;
    h.engine
        .add_animation(Animation::fade_in(id.clone(), 1000.0))
        .await;

    h.engine.handle_seek(500.0);
    assert_eq!(h.engine.frame().element(&id).unwrap().state.opacity, 0.5);

    h.engine.handle_seek(1500.0);
    assert_eq!(h.engine.frame().element(&id).unwrap().state.opacity, 1.0);

    let handle = h.engine.synchronizer().handle_for(&id).unwrap();
    assert_eq!(h.surface.lock().visual(handle).unwrap().state.unwrap().opacity, 1.0);
}

#[tokio::test]
async fn character_slide_creates_staggered_glyph_tracks() {
    let mut h = harness();
    let id = h.engine.add(title("abc", TimeFrame::new(0.0, 5000.0))).await;
    h.engine
        .add_animation(Animation::slide_in(
            id.clone(),
            900.0,
            SlideProperties::new(SlideDirection::Left).by_character(),
        ))
        .await;

    let starts: Vec<f64> = h
        .engine
        .timeline()
        .tracks()
        .filter(|t| t.channel() == Channel::Position)
        .filter(|t| matches!(t.target, TrackTarget::Glyph { .. }))
        .map(|t| t.start_ms)
        .collect();
    assert_eq!(starts, vec![0.0, 150.0, 300.0]);

    assert_eq!(h.engine.synchronizer().glyph_count(), 3);
    assert_eq!(h.surface.lock().len(), 4);
}

#[tokio::test]
async fn embedded_image_survives_save_and_reload() {
    let payload = vec![0x89, b'P', b'N', b'G', 1, 2, 3, 4];
    let resolver = MemoryResolver::new().with("blob:photo", "image/png", payload.clone());
    let mut h = harness_with(HeadlessDecoder::new(), resolver);
    h.engine
        .add_resource(MediaKind::Image, MediaRef::session("blob:photo"));
    let id = h
        .engine
        .add(Element::image(
            "Photo",
            MediaRef::session("blob:photo"),
            200.0,
            100.0,
            TimeFrame::new(0.0, 5000.0),
        ))
        .await;

    let bytes = h.engine.serialize().await.unwrap();

    let mut fresh = harness();
    assert!(fresh.engine.elements().is_empty());
    let report = fresh.engine.deserialize(&bytes).await.unwrap();
    assert_eq!(report.restored, 1);
    assert_eq!(report.dropped, 0);

    let element = &fresh.engine.elements()[0];
    assert_eq!(element.id, id);
    let src = element.media_src().unwrap();
    assert!(src.is_durable());
    assert_eq!(src.decode_payload().unwrap().unwrap(), payload);

    // The session registry entry is replaced by the durable copy.
    let images = fresh.engine.resources().list(MediaKind::Image);
    assert_eq!(images.len(), 1);
    assert!(images[0].is_durable());
}

#[tokio::test]
async fn playback_stops_and_rewinds_past_the_end() {
    let mut h = harness();
    h.engine.handle_seek(29_000.0);
    h.engine.set_playing(true);
    assert_eq!(h.engine.playback_state(), PlaybackState::Playing);

    h.wall.advance_ms(1_500.0);
    assert!(!h.engine.tick());
    assert_eq!(h.engine.playback_state(), PlaybackState::Stopped);
    assert_eq!(h.engine.current_key_frame(), 0);
    assert_eq!(h.engine.time_ms(), 0.0);
}

#[tokio::test]
async fn run_playback_returns_once_finished() {
    let mut h = harness();
    h.engine.handle_seek(29_000.0);
    h.engine.set_playing(true);
    h.wall.advance_ms(2_000.0);

    h.engine.run_playback(Duration::from_millis(1)).await;
    assert!(!h.engine.is_playing());
    assert_eq!(h.engine.current_key_frame(), 0);
}

#[tokio::test]
async fn tick_advances_and_resamples() {
    let mut h = harness();
    let id = h.engine.add(title("Hello", TimeFrame::new(0.0, 5000.0))).await;
    h.engine
        .add_animation(Animation::fade_in(id.clone(), 1000.0))
        .await;

    h.engine.set_playing(true);
    h.wall.advance_ms(250.0);
    assert!(h.engine.tick());
    assert_eq!(h.engine.time_ms(), 250.0);
    assert_eq!(h.engine.current_key_frame(), 15);
    assert_eq!(h.engine.frame().element(&id).unwrap().state.opacity, 0.25);
}

#[tokio::test]
async fn added_element_is_listed_and_selected() {
    let mut h = harness();
    let element = title("Hello", TimeFrame::new(0.0, 5000.0));
    let id = h.engine.add(element.clone()).await;

    assert!(h.engine.elements().contains(&element));
    assert_eq!(h.engine.scene().selected_id(), Some(&id));

    let handle = h.engine.synchronizer().handle_for(&id).unwrap();
    assert_eq!(h.surface.lock().active(), Some(handle));
}

#[tokio::test]
async fn unknown_ids_leave_state_untouched() {
    let mut h = harness();
    h.engine.add(title("Hello", TimeFrame::new(0.0, 5000.0))).await;
    let before = h.engine.elements().to_vec();
    let ghost = ElementId::from("ghost");

    assert!(!h.engine.remove(&ghost).await);
    assert!(!h.engine.update(&ghost, ElementPatch::name("x")).await);
    assert!(
        !h.engine
            .update_time_frame(&ghost, TimeFrame::new(0.0, 10.0))
            .await
    );
    assert!(!h.engine.select(Some(&ghost)));

    let ghost_animation = Animation::fade_in(ghost.clone(), 100.0).id;
    assert!(
        !h.engine
            .update_animation(&ghost_animation, AnimationPatch::default())
            .await
    );
    assert!(!h.engine.remove_animation(&ghost_animation).await);

    assert_eq!(h.engine.elements(), before.as_slice());
}

#[tokio::test]
async fn remove_drops_visual_but_keeps_guide() {
    let mut h = harness();
    let id = h.engine.add(title("Hello", TimeFrame::new(0.0, 5000.0))).await;
    assert!(h.engine.remove(&id).await);

    let surface = h.surface.lock();
    assert!(surface.is_empty());
    assert!(surface.has_background_guide());
    drop(surface);
    assert!(h.engine.scene().selected_id().is_none());
}

#[tokio::test]
async fn durable_state_round_trips() {
    let mut h = harness();
    let a = h.engine.add(title("One", TimeFrame::new(0.0, 5000.0))).await;
    let b = h.engine.add(title("Two", TimeFrame::new(1000.0, 8000.0))).await;
    h.engine.add_animation(Animation::fade_in(a.clone(), 400.0)).await;
    h.engine
        .add_animation(Animation::slide_out(
            b.clone(),
            600.0,
            SlideProperties::new(SlideDirection::Right).with_clip_path(),
        ))
        .await;
    h.engine.set_background_color("#202020");
    h.engine.set_export_format(ExportFormat::Webm);
    h.engine.set_menu_option("text");
    h.engine.select(Some(&a));

    let bytes = h.engine.serialize().await.unwrap();
    let mut fresh = harness();
    fresh.engine.deserialize(&bytes).await.unwrap();

    assert_eq!(fresh.engine.info().name, h.engine.info().name);
    assert_eq!(fresh.engine.info().id, h.engine.info().id);
    assert_eq!(fresh.engine.elements(), h.engine.elements());
    assert_eq!(fresh.engine.animations(), h.engine.animations());
    assert_eq!(fresh.engine.settings(), h.engine.settings());
    assert_eq!(fresh.engine.menu_option(), "text");
    assert_eq!(fresh.engine.scene().selected_id(), Some(&a));
    assert_eq!(
        fresh.engine.timeline().track_count(),
        h.engine.timeline().track_count()
    );
}

#[tokio::test]
async fn degenerate_frames_are_never_visible() {
    let mut h = harness();
    let id = h.engine.add(title("Hello", TimeFrame::new(3000.0, 1000.0))).await;
    h.engine.add_animation(Animation::fade_in(id.clone(), 500.0)).await;

    assert_eq!(h.engine.timeline().track_count(), 0);
    for t in [0.0, 1000.0, 2000.0, 3000.0] {
        h.engine.handle_seek(t);
        assert!(h.engine.visible_ids().is_empty());
    }
}

#[tokio::test]
async fn rejected_bytes_leave_the_project_alone() {
    let mut h = harness();
    h.engine.add(title("Hello", TimeFrame::new(0.0, 5000.0))).await;

    let err = h.engine.deserialize(b"not a project").await.unwrap_err();
    assert!(err.is_format());
    assert_eq!(h.engine.elements().len(), 1);
}

#[tokio::test]
async fn legacy_plain_json_loads() {
    let mut doc = ProjectDocument::new("Legacy", ProjectSettings::default());
    doc.elements.push(title("Old", TimeFrame::new(0.0, 2000.0)));
    let plain = doc.to_json_vec().unwrap();

    let mut h = harness();
    h.engine.deserialize(&plain).await.unwrap();
    assert_eq!(h.engine.info().name, "Legacy");
    assert_eq!(h.engine.elements().len(), 1);
}

#[tokio::test]
async fn time_frame_updates_clamp_and_respect_audio_lock() {
    let mut h = harness();
    let text = h.engine.add(title("Hello", TimeFrame::new(0.0, 5000.0))).await;
    assert!(
        h.engine
            .update_time_frame(&text, TimeFrame::new(-500.0, 40_000.0))
            .await
    );
    assert_eq!(
        h.engine.scene().get(&text).unwrap().time_frame,
        TimeFrame::new(0.0, 30_000.0)
    );

    let audio = h.engine.add(locked_audio(TimeFrame::new(1000.0, 4000.0))).await;
    h.engine
        .update_time_frame(&audio, TimeFrame::new(2000.0, 6000.0))
        .await;
    assert_eq!(
        h.engine.scene().get(&audio).unwrap().time_frame,
        TimeFrame::new(1000.0, 6000.0)
    );
}

fn locked_audio(frame: TimeFrame) -> Element {
    Element::new(
        "Music",
        Placement::default(),
        frame,
        ElementProperties::Audio(AudioProperties {
            src: MediaRef::external("music.mp3"),
            volume: 1.0,
            muted: false,
            start_locked: true,
        }),
    )
}

#[tokio::test]
async fn plain_updates_respect_the_audio_lock() {
    let mut h = harness();
    let audio = h.engine.add(locked_audio(TimeFrame::new(1000.0, 4000.0))).await;

    let patch = ElementPatch {
        name: Some("Theme".to_string()),
        time_frame: Some(TimeFrame::new(2500.0, 40_000.0)),
        ..ElementPatch::default()
    };
    assert!(h.engine.update(&audio, patch).await);

    let element = h.engine.scene().get(&audio).unwrap();
    assert_eq!(element.name, "Theme");
    assert_eq!(element.time_frame, TimeFrame::new(1000.0, 30_000.0));
}

#[tokio::test]
async fn edits_leaving_no_time_are_rejected() {
    let mut h = harness();
    let text = h.engine.add(title("Hello", TimeFrame::new(0.0, 5000.0))).await;

    assert!(
        !h.engine
            .update_time_frame(&text, TimeFrame::new(35_000.0, 40_000.0))
            .await
    );
    let patch = ElementPatch {
        name: Some("Renamed".to_string()),
        time_frame: Some(TimeFrame::new(4000.0, 2000.0)),
        ..ElementPatch::default()
    };
    assert!(!h.engine.update(&text, patch).await);

    let element = h.engine.scene().get(&text).unwrap();
    assert_eq!(element.name, "Title");
    assert_eq!(element.time_frame, TimeFrame::new(0.0, 5000.0));

    // A locked start past the new end leaves nothing either.
    let audio = h.engine.add(locked_audio(TimeFrame::new(3000.0, 4000.0))).await;
    assert!(
        !h.engine
            .update(&audio, ElementPatch::time_frame(TimeFrame::new(0.0, 2000.0)))
            .await
    );
    assert_eq!(
        h.engine.scene().get(&audio).unwrap().time_frame,
        TimeFrame::new(3000.0, 4000.0)
    );
}

#[tokio::test]
async fn imports_size_and_span_from_the_decoder() {
    let long = MediaRef::external("long.mp4");
    let decoder = HeadlessDecoder::new().with_media(
        long.clone(),
        DecodedMedia {
            width: 400.0,
            height: 200.0,
            duration_ms: Some(60_000.0),
        },
    );
    let mut h = harness_with(decoder, MemoryResolver::new());

    let clip = h.engine.add_resource(MediaKind::Video, MediaRef::external("clip.mp4"));
    let id = h.engine.import_video(clip).await.unwrap().unwrap();
    let video = h.engine.scene().get(&id).unwrap();
    assert_eq!(video.name, "Video 1");
    assert_eq!(video.placement.height, 100.0);
    assert!((video.placement.width - 100.0 * 1920.0 / 1080.0).abs() < 1e-9);
    assert_eq!(video.time_frame, TimeFrame::new(0.0, 5000.0));

    let long_index = h.engine.add_resource(MediaKind::Video, long);
    let id = h.engine.import_video(long_index).await.unwrap().unwrap();
    let video = h.engine.scene().get(&id).unwrap();
    assert_eq!(video.name, "Video 2");
    assert_eq!(video.placement.width, 200.0);
    assert_eq!(video.time_frame, TimeFrame::new(0.0, 30_000.0));

    let image = h.engine.add_resource(MediaKind::Image, MediaRef::external("still.png"));
    let id = h.engine.import_image(image).await.unwrap().unwrap();
    assert_eq!(
        h.engine.scene().get(&id).unwrap().time_frame,
        TimeFrame::new(0.0, 30_000.0)
    );

    let track = h.engine.add_resource(MediaKind::Audio, MediaRef::external("track.mp3"));
    let id = h.engine.import_audio(track).await.unwrap().unwrap();
    let audio = h.engine.scene().get(&id).unwrap();
    assert_eq!(audio.time_frame, TimeFrame::new(0.0, 5000.0));
    assert!(matches!(
        audio.properties,
        ElementProperties::Audio(AudioProperties {
            start_locked: true,
            ..
        })
    ));

    assert_eq!(h.engine.import_audio(7).await.unwrap(), None);
}

#[tokio::test]
async fn import_of_undecodable_media_fails() {
    let broken = MediaRef::session("blob:broken");
    let decoder = HeadlessDecoder::new().with_broken(broken.clone());
    let mut h = harness_with(decoder, MemoryResolver::new());

    let index = h.engine.add_resource(MediaKind::Image, broken);
    assert!(h.engine.import_image(index).await.is_err());
    assert!(h.engine.elements().is_empty());
}

#[tokio::test]
async fn visual_edits_write_back_to_the_scene() {
    let mut h = harness();
    let id = h
        .engine
        .add(Element::image(
            "Photo",
            MediaRef::external("photo.png"),
            200.0,
            100.0,
            TimeFrame::new(0.0, 5000.0),
        ))
        .await;
    let handle = h.engine.synchronizer().handle_for(&id).unwrap();

    let mut transform = VisualTransform::from_placement(&Placement::new(0.0, 0.0, 200.0, 100.0));
    transform.x = 50.0;
    transform.scale_x = 2.0;
    assert!(h.engine.handle_visual_modified(handle, transform.clone()).await);

    let placement = h.engine.scene().get(&id).unwrap().placement;
    assert_eq!(placement.x, 50.0);
    assert_eq!(placement.width, 400.0);
    assert_eq!(placement.scale_x, 1.0);

    assert!(
        !h.engine
            .handle_visual_modified(VisualHandle(9_999), transform)
            .await
    );
}

#[tokio::test]
async fn animation_updates_recompile() {
    let mut h = harness();
    let id = h.engine.add(title("Hello", TimeFrame::new(0.0, 5000.0))).await;
    let fade = h
        .engine
        .add_animation(Animation::fade_in(id.clone(), 1000.0))
        .await;

    h.engine
        .update_animation(
            &fade,
            AnimationPatch {
                duration_ms: Some(2000.0),
                kind: None,
            },
        )
        .await;
    h.engine.handle_seek(500.0);
    assert_eq!(h.engine.frame().element(&id).unwrap().state.opacity, 0.25);

    h.engine
        .update_animation(
            &fade,
            AnimationPatch {
                duration_ms: None,
                kind: Some(AnimationKind::FadeOut),
            },
        )
        .await;
    h.engine.handle_seek(500.0);
    assert_eq!(h.engine.frame().element(&id).unwrap().state.opacity, 1.0);

    assert!(h.engine.remove_animation(&fade).await);
    assert!(h.engine.timeline().is_empty());
}

#[tokio::test]
async fn export_renders_every_frame_and_restores_the_playhead() {
    let mut h = harness();
    h.engine.set_max_time(1000.0);
    let id = h.engine.add(title("Late", TimeFrame::new(500.0, 1000.0))).await;
    h.engine.handle_seek(400.0);

    let stages = Arc::new(Mutex::new(Vec::new()));
    let sink = stages.clone();
    let progress: ProgressCallback = Box::new(move |p| sink.lock().unwrap().push(p.stage));

    let bytes = h
        .engine
        .export(&ManifestEncoder, 10, Some(&progress))
        .await
        .unwrap();
    let manifest: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(manifest["frames"], 10);
    assert_eq!(manifest["format"], "mp4");

    assert_eq!(stages.lock().unwrap().last(), Some(&ExportStage::Complete));
    assert_eq!(h.engine.time_ms(), 400.0);
    assert!(!visible_on_surface(&h, &id));
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

fn durable_media() -> impl Strategy<Value = MediaRef> {
    prop_oneof![
        "[a-z]{1,8}".prop_map(|stem| MediaRef::external(format!("{stem}.bin"))),
        prop::collection::vec(any::<u8>(), 0..32)
            .prop_map(|bytes| MediaRef::embed("application/octet-stream", &bytes)),
    ]
}

fn effect() -> impl Strategy<Value = Effect> {
    prop_oneof![
        Just(Effect::None),
        Just(Effect::BlackAndWhite),
        Just(Effect::Sepia),
        Just(Effect::Invert),
        Just(Effect::Saturate),
    ]
}

fn properties() -> impl Strategy<Value = ElementProperties> {
    prop_oneof![
        (durable_media(), effect(), 0.0f64..5000.0).prop_map(|(src, effect, media_offset_ms)| {
            ElementProperties::Video(VideoProperties {
                src,
                effect,
                media_offset_ms,
            })
        }),
        (durable_media(), effect())
            .prop_map(|(src, effect)| ElementProperties::Image(ImageProperties { src, effect })),
        (durable_media(), 0.0f64..1.0, any::<bool>(), any::<bool>()).prop_map(
            |(src, volume, muted, start_locked)| {
                ElementProperties::Audio(AudioProperties {
                    src,
                    volume,
                    muted,
                    start_locked,
                })
            }
        ),
        ("[a-zA-Z ]{0,12}", 8.0f64..96.0, 100u32..900).prop_map(|(text, size, weight)| {
            Element::text("t", text, size, weight, TimeFrame::new(0.0, 1.0)).properties
        }),
        (durable_media(), "[a-z0-9+*() ]{1,10}", effect()).prop_map(|(src, formula, effect)| {
            ElementProperties::MathPlot(MathPlotProperties {
                src,
                formula,
                effect,
            })
        }),
    ]
}

fn element() -> impl Strategy<Value = Element> {
    (
        "[A-Za-z ]{1,10}",
        (-200.0f64..1000.0, -200.0f64..700.0, 1.0f64..800.0, 1.0f64..500.0),
        (0.0f64..20_000.0, 1.0f64..10_000.0),
        properties(),
    )
        .prop_map(|(name, (x, y, w, h), (start, len), properties)| {
            Element::new(
                name,
                Placement::new(x, y, w, h),
                TimeFrame::new(start, start + len),
                properties,
            )
        })
}

fn slide() -> impl Strategy<Value = SlideProperties> {
    (
        prop_oneof![
            Just(SlideDirection::Left),
            Just(SlideDirection::Right),
            Just(SlideDirection::Top),
            Just(SlideDirection::Bottom),
        ],
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(direction, clip, by_character)| {
            let mut props = SlideProperties::new(direction);
            if clip {
                props = props.with_clip_path();
            }
            if by_character {
                props = props.by_character();
            }
            props
        })
}

/// An animation for the element at `target % elements.len()`.
fn animation_spec() -> impl Strategy<Value = (usize, u8, f64, SlideProperties)> {
    (any::<usize>(), 0u8..5, 1.0f64..3000.0, slide())
}

fn build_animation(target: ElementId, (_, kind, duration, props): (usize, u8, f64, SlideProperties)) -> Animation {
    match kind {
        0 => Animation::fade_in(target, duration),
        1 => Animation::fade_out(target, duration),
        2 => Animation::slide_in(target, duration, props),
        3 => Animation::slide_out(target, duration, props),
        _ => Animation::breathe(target),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn durable_projects_survive_save_and_reload(
        elements in prop::collection::vec(element(), 0..8),
        animations in prop::collection::vec(animation_spec(), 0..8),
    ) {
        let (original, reloaded) = block_on(async {
            let mut h = harness();
            for element in &elements {
                h.engine.add(element.clone()).await;
            }
            if !elements.is_empty() {
                for spec in animations {
                    let target = elements[spec.0 % elements.len()].id.clone();
                    h.engine.add_animation(build_animation(target, spec)).await;
                }
            }
            let bytes = h.engine.serialize().await.unwrap();
            let mut fresh = harness();
            fresh.engine.deserialize(&bytes).await.unwrap();
            (h, fresh)
        });

        let ids: Vec<_> = elements.iter().map(|e| e.id.clone()).collect();
        let reloaded_ids: Vec<_> = reloaded.engine.elements().iter().map(|e| e.id.clone()).collect();
        prop_assert_eq!(ids, reloaded_ids);
        for (before, after) in original.engine.elements().iter().zip(reloaded.engine.elements()) {
            prop_assert_eq!(before.time_frame, after.time_frame);
            prop_assert_eq!(before.placement, after.placement);
            prop_assert_eq!(&before.properties, &after.properties);
        }
        prop_assert_eq!(original.engine.animations(), reloaded.engine.animations());
        prop_assert_eq!(original.engine.scene().selected_id(), reloaded.engine.scene().selected_id());
        prop_assert_eq!(
            original.engine.timeline().track_count(),
            reloaded.engine.timeline().track_count()
        );
    }

    #[test]
    fn every_add_is_listed_once_and_selected(
        adds in prop::collection::vec((element(), prop::option::of(any::<usize>())), 1..12),
    ) {
        block_on(async {
            let mut h = harness();
            let mut added: Vec<ElementId> = Vec::new();
            for (mut element, reuse) in adds {
                // Sometimes re-add under an id that is already present.
                if let (Some(i), false) = (reuse, added.is_empty()) {
                    element.id = added[i % added.len()].clone();
                }
                let id = h.engine.add(element.clone()).await;
                prop_assert_eq!(&id, &element.id);
                if !added.contains(&id) {
                    added.push(id.clone());
                }

                let listed = h.engine.elements().iter().filter(|e| e.id == id).count();
                prop_assert_eq!(listed, 1);
                prop_assert_eq!(h.engine.scene().get(&id), Some(&element));
                prop_assert_eq!(h.engine.scene().selected_id(), Some(&id));
                prop_assert_eq!(h.engine.elements().len(), added.len());
            }
            Ok::<(), TestCaseError>(())
        })?;
    }

    #[test]
    fn unknown_ids_never_change_the_project(
        elements in prop::collection::vec(element(), 1..6),
        ghost in "ghost-[a-z0-9]{1,12}",
        frame in (0.0f64..30_000.0, 1.0f64..5000.0),
    ) {
        block_on(async {
            let mut h = harness();
            for element in &elements {
                h.engine.add(element.clone()).await;
            }
            let before = h.engine.to_document();
            let ghost = ElementId::from(ghost.as_str());
            let ghost_animation = Animation::fade_in(ghost.clone(), 100.0).id;

            prop_assert!(!h.engine.remove(&ghost).await);
            prop_assert!(!h.engine.update(&ghost, ElementPatch::name("x")).await);
            prop_assert!(
                !h.engine
                    .update_time_frame(&ghost, TimeFrame::new(frame.0, frame.0 + frame.1))
                    .await
            );
            prop_assert!(!h.engine.select(Some(&ghost)));
            prop_assert!(
                !h.engine
                    .update_animation(&ghost_animation, AnimationPatch::default())
                    .await
            );
            prop_assert!(!h.engine.remove_animation(&ghost_animation).await);

            let after = h.engine.to_document();
            prop_assert_eq!(before.elements, after.elements);
            prop_assert_eq!(before.animations, after.animations);
            prop_assert_eq!(before.ui.selected_element, after.ui.selected_element);
            Ok::<(), TestCaseError>(())
        })?;
    }
}

proptest! {
    #[test]
    fn seeking_twice_gives_the_same_frame(t in 0.0f64..30_000.0) {
        let mut h = harness();
        block_on(async {
            let id = h.engine.add(title("abc", TimeFrame::new(1000.0, 9000.0))).await;
            h.engine.add_animation(Animation::fade_in(id.clone(), 700.0)).await;
            h.engine
                .add_animation(Animation::slide_in(
                    id.clone(),
                    900.0,
                    SlideProperties::new(SlideDirection::Top).by_character(),
                ))
                .await;
            h.engine.add_animation(Animation::breathe(id)).await;
        });

        h.engine.handle_seek(t);
        let first = h.engine.frame();
        h.engine.handle_seek(t);
        prop_assert_eq!(first, h.engine.frame());
    }
}
