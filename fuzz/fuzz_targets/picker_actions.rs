#![no_main]

use libfuzzer_sys::fuzz_target;
use lyricpick::model::{Variant, VariantSet};
use lyricpick::picker::{PickOutcome, Picker, PickerAction};

fuzz_target!(|data: &[u8]| {
    let len = (data.len() % 8).max(1);
    let variants: VariantSet = (0..len)
        .map(|idx| Variant {
            source_id: format!("SOURCE{idx}"),
            title: String::from("title"),
            artist: String::from("artist"),
            lyrics: format!("lyrics {idx}"),
        })
        .collect();
    let Some(mut picker) = Picker::new(variants, "lyrics 0") else {
        return;
    };

    for byte in data {
        let action = match byte % 7 {
            0 => PickerAction::Accept,
            1 => PickerAction::KeepOriginal,
            2 => PickerAction::Skip,
            3 => PickerAction::Edit,
            4 => PickerAction::Play,
            5 => PickerAction::Stop,
            _ => PickerAction::Advance,
        };
        let expected = picker.current().clone();
        match picker.apply(action) {
            Some(PickOutcome::Adopt(chosen)) => assert_eq!(chosen, expected),
            Some(_) => assert!(matches!(
                action,
                PickerAction::KeepOriginal | PickerAction::Skip
            )),
            None => assert!(picker.cursor() < picker.len()),
        }
        assert_eq!(picker.is_identical(), picker.current().lyrics == "lyrics 0");
    }
});
