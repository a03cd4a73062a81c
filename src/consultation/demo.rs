/// Sample consultation used by `soapnote analyze --demo`.
pub const DEMO_CONSULTATION: &str = "\
Doctor: Good morning, what brings you in today?
Patient: Hello doctor, I'm Sarah Ahmed, 28 years old. I've had a severe headache for the past 2 days, along with high fever around 102°F and body aches.
Doctor: I see. Have you experienced any nausea or vomiting?
Patient: Yes, I had nausea yesterday evening and felt very weak.
Doctor: Any cough, sore throat, or difficulty breathing?
Patient: No cough, but my throat feels a bit scratchy. No breathing issues though.
Doctor: Have you taken any medications so far?
Patient: Just some home remedies like warm water with honey, but the fever hasn't gone down.
Doctor: Based on your symptoms - high fever, headache, body aches, nausea, and scratchy throat - this appears to be a viral infection, most likely influenza. I'll prescribe you paracetamol for the fever and pain, an antiemetic for the nausea, and a throat lozenge for the throat discomfort.
Patient: Thank you, doctor. How long should I take these medications?
Doctor: Take paracetamol 500mg three times daily after meals for 5 days. The antiemetic should be taken twice daily for 3 days, and use the throat lozenges as needed. Make sure to rest well, drink plenty of fluids - at least 8 glasses of water daily, and avoid going out in the cold. If your fever doesn't come down in 3 days or if symptoms worsen, please come back for a follow-up.
Patient: Understood. Should I be worried about anything else?
Doctor: Monitor your temperature regularly. If it goes above 103°F or if you develop breathing difficulty, chest pain, or severe weakness, seek immediate medical attention. Otherwise, you should start feeling better in 3-5 days with proper rest and medication.
Patient: Thank you so much, doctor. I'll follow your advice.
Doctor: You're welcome. Take care and get well soon!";
