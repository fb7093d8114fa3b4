use super::{LanguageCode, LocaleProfile};

pub(super) fn lookup(code: LanguageCode) -> &'static LocaleProfile {
    match code {
        LanguageCode::En => &EN,
        LanguageCode::Hi => &HI,
        LanguageCode::Kn => &KN,
        LanguageCode::Ta => &TA,
        LanguageCode::Te => &TE,
        LanguageCode::Ml => &ML,
        LanguageCode::Bn => &BN,
        LanguageCode::Gu => &GU,
        LanguageCode::Pa => &PA,
    }
}

static EN: LocaleProfile = LocaleProfile {
    code: LanguageCode::En,
    english_name: "English",
    native_name: "English",
    greeting: "Hi! Upload an image to get started.",
    uploaded_image: "📷 Uploaded image: {file}",
    thinking: "Thinking...",
    prediction_line: "**Prediction:** {label}",
    confidence_line: "**Confidence:** {confidence}",
    healthy_plant: "🌿 No disease detected. Your plant looks healthy!",
    disclaimer: "_This is an AI-generated assessment. Please consult a local agricultural expert before acting on it._",
    error_line: "Error: {detail}",
    export_success: "📄 Report downloaded as {file}.",
    export_failure: "Could not generate the report: {detail}",
    input_hint: "Ask about the diagnosis...",
    upload_hint: "Upload a plant leaf image to begin.",
};

static HI: LocaleProfile = LocaleProfile {
    code: LanguageCode::Hi,
    english_name: "Hindi",
    native_name: "हिन्दी",
    greeting: "नमस्ते! शुरू करने के लिए एक छवि अपलोड करें।",
    uploaded_image: "📷 अपलोड की गई छवि: {file}",
    thinking: "सोच रहा है...",
    prediction_line: "**पूर्वानुमान:** {label}",
    confidence_line: "**विश्वास स्तर:** {confidence}",
    healthy_plant: "🌿 कोई रोग नहीं मिला। आपका पौधा स्वस्थ दिखता है!",
    disclaimer: "_यह एआई द्वारा तैयार किया गया आकलन है। कोई भी कदम उठाने से पहले स्थानीय कृषि विशेषज्ञ से सलाह लें।_",
    error_line: "त्रुटि: {detail}",
    export_success: "📄 रिपोर्ट {file} के रूप में डाउनलोड हो गई।",
    export_failure: "रिपोर्ट नहीं बन सकी: {detail}",
    input_hint: "निदान के बारे में पूछें...",
    upload_hint: "शुरू करने के लिए पौधे की पत्ती की छवि अपलोड करें।",
};

static KN: LocaleProfile = LocaleProfile {
    code: LanguageCode::Kn,
    english_name: "Kannada",
    native_name: "ಕನ್ನಡ",
    greeting: "ನಮಸ್ಕಾರ! ಪ್ರಾರಂಭಿಸಲು ಒಂದು ಚಿತ್ರವನ್ನು ಅಪ್‌ಲೋಡ್ ಮಾಡಿ.",
    uploaded_image: "📷 ಅಪ್‌ಲೋಡ್ ಮಾಡಿದ ಚಿತ್ರ: {file}",
    thinking: "ಯೋಚಿಸುತ್ತಿದೆ...",
    prediction_line: "**ಮುನ್ಸೂಚನೆ:** {label}",
    confidence_line: "**ವಿಶ್ವಾಸ:** {confidence}",
    healthy_plant: "🌿 ಯಾವುದೇ ರೋಗ ಕಂಡುಬಂದಿಲ್ಲ. ನಿಮ್ಮ ಸಸ್ಯ ಆರೋಗ್ಯವಾಗಿದೆ!",
    disclaimer: "_ಇದು ಎಐ ರಚಿಸಿದ ಮೌಲ್ಯಮಾಪನ. ಕ್ರಮ ಕೈಗೊಳ್ಳುವ ಮೊದಲು ಸ್ಥಳೀಯ ಕೃಷಿ ತಜ್ಞರನ್ನು ಸಂಪರ್ಕಿಸಿ._",
    error_line: "ದೋಷ: {detail}",
    export_success: "📄 ವರದಿಯನ್ನು {file} ಆಗಿ ಡೌನ್‌ಲೋಡ್ ಮಾಡಲಾಗಿದೆ.",
    export_failure: "ವರದಿಯನ್ನು ರಚಿಸಲು ಸಾಧ್ಯವಾಗಲಿಲ್ಲ: {detail}",
    input_hint: "ರೋಗನಿರ್ಣಯದ ಬಗ್ಗೆ ಕೇಳಿ...",
    upload_hint: "ಪ್ರಾರಂಭಿಸಲು ಸಸ್ಯದ ಎಲೆಯ ಚಿತ್ರವನ್ನು ಅಪ್‌ಲೋಡ್ ಮಾಡಿ.",
};

static TA: LocaleProfile = LocaleProfile {
    code: LanguageCode::Ta,
    english_name: "Tamil",
    native_name: "தமிழ்",
    greeting: "வணக்கம்! தொடங்க ஒரு படத்தைப் பதிவேற்றவும்.",
    uploaded_image: "📷 பதிவேற்றிய படம்: {file}",
    thinking: "யோசிக்கிறது...",
    prediction_line: "**கணிப்பு:** {label}",
    confidence_line: "**நம்பகத்தன்மை:** {confidence}",
    healthy_plant: "🌿 எந்த நோயும் கண்டறியப்படவில்லை. உங்கள் செடி ஆரோக்கியமாக உள்ளது!",
    disclaimer: "_இது AI உருவாக்கிய மதிப்பீடு. நடவடிக்கை எடுப்பதற்கு முன் உள்ளூர் வேளாண் நிபுணரை அணுகவும்._",
    error_line: "பிழை: {detail}",
    export_success: "📄 அறிக்கை {file} ஆகப் பதிவிறக்கப்பட்டது.",
    export_failure: "அறிக்கையை உருவாக்க முடியவில்லை: {detail}",
    input_hint: "நோயறிதல் பற்றி கேளுங்கள்...",
    upload_hint: "தொடங்க ஒரு இலையின் படத்தைப் பதிவேற்றவும்.",
};

static TE: LocaleProfile = LocaleProfile {
    code: LanguageCode::Te,
    english_name: "Telugu",
    native_name: "తెలుగు",
    greeting: "నమస్కారం! ప్రారంభించడానికి ఒక చిత్రాన్ని అప్‌లోడ్ చేయండి.",
    uploaded_image: "📷 అప్‌లోడ్ చేసిన చిత్రం: {file}",
    thinking: "ఆలోచిస్తోంది...",
    prediction_line: "**అంచనా:** {label}",
    confidence_line: "**నమ్మకం:** {confidence}",
    healthy_plant: "🌿 ఎలాంటి వ్యాధి కనిపించలేదు. మీ మొక్క ఆరోగ్యంగా ఉంది!",
    disclaimer: "_ఇది AI రూపొందించిన అంచనా. చర్య తీసుకునే ముందు స్థానిక వ్యవసాయ నిపుణుడిని సంప్రదించండి._",
    error_line: "లోపం: {detail}",
    export_success: "📄 నివేదిక {file}గా డౌన్‌లోడ్ అయింది.",
    export_failure: "నివేదికను రూపొందించలేకపోయాం: {detail}",
    input_hint: "నిర్ధారణ గురించి అడగండి...",
    upload_hint: "ప్రారంభించడానికి మొక్క ఆకు చిత్రాన్ని అప్‌లోడ్ చేయండి.",
};

static ML: LocaleProfile = LocaleProfile {
    code: LanguageCode::Ml,
    english_name: "Malayalam",
    native_name: "മലയാളം",
    greeting: "നമസ്കാരം! ആരംഭിക്കാൻ ഒരു ചിത്രം അപ്‌ലോഡ് ചെയ്യുക.",
    uploaded_image: "📷 അപ്‌ലോഡ് ചെയ്ത ചിത്രം: {file}",
    thinking: "ചിന്തിക്കുന്നു...",
    prediction_line: "**പ്രവചനം:** {label}",
    confidence_line: "**വിശ്വാസ്യത:** {confidence}",
    healthy_plant: "🌿 രോഗമൊന്നും കണ്ടെത്തിയില്ല. നിങ്ങളുടെ ചെടി ആരോഗ്യത്തോടെയിരിക്കുന്നു!",
    disclaimer: "_ഇത് AI തയ്യാറാക്കിയ വിലയിരുത്തലാണ്. നടപടിയെടുക്കുന്നതിന് മുമ്പ് പ്രാദേശിക കൃഷി വിദഗ്ധനെ സമീപിക്കുക._",
    error_line: "പിശക്: {detail}",
    export_success: "📄 റിപ്പോർട്ട് {file} ആയി ഡൗൺലോഡ് ചെയ്തു.",
    export_failure: "റിപ്പോർട്ട് തയ്യാറാക്കാൻ കഴിഞ്ഞില്ല: {detail}",
    input_hint: "രോഗനിർണയത്തെക്കുറിച്ച് ചോദിക്കുക...",
    upload_hint: "ആരംഭിക്കാൻ ഇലയുടെ ചിത്രം അപ്‌ലോഡ് ചെയ്യുക.",
};

static BN: LocaleProfile = LocaleProfile {
    code: LanguageCode::Bn,
    english_name: "Bengali",
    native_name: "বাংলা",
    greeting: "নমস্কার! শুরু করতে একটি ছবি আপলোড করুন।",
    uploaded_image: "📷 আপলোড করা ছবি: {file}",
    thinking: "ভাবছি...",
    prediction_line: "**পূর্বাভাস:** {label}",
    confidence_line: "**আস্থা:** {confidence}",
    healthy_plant: "🌿 কোনো রোগ পাওয়া যায়নি। আপনার গাছটি সুস্থ দেখাচ্ছে!",
    disclaimer: "_এটি এআই-তৈরি মূল্যায়ন। কোনো পদক্ষেপ নেওয়ার আগে স্থানীয় কৃষি বিশেষজ্ঞের পরামর্শ নিন।_",
    error_line: "ত্রুটি: {detail}",
    export_success: "📄 প্রতিবেদনটি {file} নামে ডাউনলোড হয়েছে।",
    export_failure: "প্রতিবেদন তৈরি করা যায়নি: {detail}",
    input_hint: "রোগনির্ণয় সম্পর্কে জিজ্ঞাসা করুন...",
    upload_hint: "শুরু করতে গাছের পাতার একটি ছবি আপলোড করুন।",
};

static GU: LocaleProfile = LocaleProfile {
    code: LanguageCode::Gu,
    english_name: "Gujarati",
    native_name: "ગુજરાતી",
    greeting: "નમસ્તે! શરૂ કરવા માટે એક છબી અપલોડ કરો.",
    uploaded_image: "📷 અપલોડ કરેલી છબી: {file}",
    thinking: "વિચારી રહ્યું છે...",
    prediction_line: "**અનુમાન:** {label}",
    confidence_line: "**વિશ્વાસ:** {confidence}",
    healthy_plant: "🌿 કોઈ રોગ મળ્યો નથી. તમારો છોડ તંદુરસ્ત લાગે છે!",
    disclaimer: "_આ એઆઈ દ્વારા તૈયાર કરાયેલું મૂલ્યાંકન છે. પગલાં લેતાં પહેલાં સ્થાનિક કૃષિ નિષ્ણાતની સલાહ લો._",
    error_line: "ભૂલ: {detail}",
    export_success: "📄 અહેવાલ {file} તરીકે ડાઉનલોડ થયો.",
    export_failure: "અહેવાલ બનાવી શકાયો નથી: {detail}",
    input_hint: "નિદાન વિશે પૂછો...",
    upload_hint: "શરૂ કરવા માટે છોડના પાનની છબી અપલોડ કરો.",
};

static PA: LocaleProfile = LocaleProfile {
    code: LanguageCode::Pa,
    english_name: "Punjabi",
    native_name: "ਪੰਜਾਬੀ",
    greeting: "ਸਤ ਸ੍ਰੀ ਅਕਾਲ! ਸ਼ੁਰੂ ਕਰਨ ਲਈ ਇੱਕ ਤਸਵੀਰ ਅੱਪਲੋਡ ਕਰੋ।",
    uploaded_image: "📷 ਅੱਪਲੋਡ ਕੀਤੀ ਤਸਵੀਰ: {file}",
    thinking: "ਸੋਚ ਰਿਹਾ ਹੈ...",
    prediction_line: "**ਅਨੁਮਾਨ:** {label}",
    confidence_line: "**ਭਰੋਸਾ:** {confidence}",
    healthy_plant: "🌿 ਕੋਈ ਬਿਮਾਰੀ ਨਹੀਂ ਮਿਲੀ। ਤੁਹਾਡਾ ਪੌਦਾ ਤੰਦਰੁਸਤ ਜਾਪਦਾ ਹੈ!",
    disclaimer: "_ਇਹ ਏਆਈ ਵੱਲੋਂ ਤਿਆਰ ਕੀਤਾ ਮੁਲਾਂਕਣ ਹੈ। ਕੋਈ ਕਦਮ ਚੁੱਕਣ ਤੋਂ ਪਹਿਲਾਂ ਸਥਾਨਕ ਖੇਤੀ ਮਾਹਿਰ ਨਾਲ ਸਲਾਹ ਕਰੋ।_",
    error_line: "ਗਲਤੀ: {detail}",
    export_success: "📄 ਰਿਪੋਰਟ {file} ਵਜੋਂ ਡਾਊਨਲੋਡ ਹੋ ਗਈ।",
    export_failure: "ਰਿਪੋਰਟ ਤਿਆਰ ਨਹੀਂ ਹੋ ਸਕੀ: {detail}",
    input_hint: "ਨਿਦਾਨ ਬਾਰੇ ਪੁੱਛੋ...",
    upload_hint: "ਸ਼ੁਰੂ ਕਰਨ ਲਈ ਪੌਦੇ ਦੇ ਪੱਤੇ ਦੀ ਤਸਵੀਰ ਅੱਪਲੋਡ ਕਰੋ।",
};
