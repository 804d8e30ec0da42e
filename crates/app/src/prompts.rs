//! Static prompt catalog.
//!
//! One row per key: Hindi first (primary audience), English as the
//! fallback rendering. Unknown keys echo the key so a missing entry is
//! audible in development instead of silently swallowed.

use tracing::warn;
use vaani_dialog::PromptSource;
use vaani_foundation::Locale;

#[rustfmt::skip]
const TABLE: &[(&str, &str, &str)] = &[
    ("login.ask_phone", "अपना मोबाइल नंबर बोलिए", "Please say your mobile number"),
    ("login.ask_phone.retry", "नंबर समझ नहीं आया, दस अंक धीरे-धीरे बोलिए", "I did not catch that, please say the ten digits slowly"),
    ("login.otp.voice", "मैसेज में आया कोड बोलिए", "Please read out the code from the message"),
    ("login.otp.retry", "कोड समझ नहीं आया, फिर से बोलिए", "I did not catch the code, please say it again"),
    ("registration.ask_name", "आपका नाम क्या है?", "What is your name?"),
    ("registration.name.retry", "नाम फिर से बोलिए", "Please say your name again"),
    ("registration.ask_age", "आपकी उम्र कितनी है?", "How old are you?"),
    ("registration.age.retry", "उम्र समझ नहीं आई, फिर से बोलिए", "I did not catch your age, please say it again"),
    ("schedule.confirm", "क्या आप सुबह आठ बजे दवा लेंगे?", "Will you take your medicine at eight in the morning?"),
    ("schedule.confirm.retry", "हाँ या नहीं बोलिए", "Please say yes or no"),
    ("schedule.ask_time", "किस समय दवा लेनी है?", "At what time should the medicine be taken?"),
    ("schedule.time.retry", "समय समझ नहीं आया, जैसे शाम सात बजे बोलिए", "I did not catch the time, say for example seven in the evening"),
    ("alarm.ask_dismiss", "दवा का समय हो गया। क्या आपने दवा ले ली?", "It is time for your medicine. Have you taken it?"),
    ("alarm.dismiss.retry", "हाँ या नहीं बोलिए", "Please say yes or no"),
];

pub struct PromptCatalog;

impl PromptSource for PromptCatalog {
    fn prompt(&self, locale: Locale, key: &str) -> String {
        for (k, hi, en) in TABLE {
            if *k == key {
                return match locale {
                    Locale::Hi => (*hi).to_string(),
                    Locale::En => (*en).to_string(),
                };
            }
        }
        warn!(target: "prompts", key, "no catalog entry; echoing key");
        key.to_string()
    }
}
