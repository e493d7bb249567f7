/*!
 * Prompt construction for the two per-batch paths.
 *
 * Both paths use the delimiter-based output protocol
 * (`<<<TRANSLATION_START_{id}>>> … <<<TRANSLATION_END_{id}>>>`) instead
 * of JSON: JSON-object response modes were observed to normalize
 * whitespace, concatenating words and destroying poetry indentation.
 */

use crate::filter::FilteredParagraph;

/// Build the standard-path prompt: numbered raw passages
pub fn build_standard_prompt(members: &[FilteredParagraph], language: &str) -> String {
    let mut passages = String::new();
    for (i, member) in members.iter().enumerate() {
        let id = i + 1;
        passages.push_str(&format!(
            "\n--- Passage {id} ---\n{}\n--- End Passage {id} ---\n",
            member.text
        ));
    }

    format!(
        "You are a professional translator. Translate the following {count} passage(s) into {language}.\n\
         \n\
         FORMATTING RULES - CHARACTER-BY-CHARACTER PRESERVATION:\n\
         1. Preserve EVERY space, newline and indentation character exactly. If a line starts\n\
            with 4 spaces, the translation starts with 4 spaces. Blank lines stay blank lines.\n\
         2. Line breaks in poetry and formatted text are artistic; keep the same number of\n\
            lines as the original, never merge or split lines.\n\
         3. Do not shorten, merge, split or summarize passages. Translate only what is\n\
            written, nothing more, nothing less.\n\
         4. Preserve all punctuation marks exactly as they appear; translate the words, not\n\
            the punctuation style.\n\
         5. Translate every word of the source language, including quoted single words and\n\
            interjections.\n\
         \n\
         OUTPUT FORMAT - USE DELIMITERS:\n\
         For EACH passage, output exactly:\n\
         \n\
         <<<TRANSLATION_START_{{i}}>>>\n\
         [your translation with exact whitespace]\n\
         <<<TRANSLATION_END_{{i}}>>>\n\
         \n\
         - Replace {{i}} with the passage number (1, 2, 3, ...).\n\
         - Return the translations in the same order and count as the passages.\n\
         - No extra text, explanations or notes outside the delimiters.\n\
         - Never put delimiter markers inside the translation text itself.\n\
         - Never include tags like <untranslated> in your output.\n\
         \n\
         Original Passages:\n\
         {passages}\n\
         Translate into {language}. Use delimiters <<<TRANSLATION_START_N>>> and <<<TRANSLATION_END_N>>> for each passage.",
        count = members.len(),
        language = language,
        passages = passages,
    )
}

/// Build the robust-path prompt from marker-wrapped passages
/// (`(id, marked_text)` pairs, ids 1-based within the batch)
pub fn build_robust_prompt(marked: &[(usize, String)], language: &str) -> String {
    let mut passages = String::new();
    for (id, marked_text) in marked {
        passages.push_str(&format!(
            "\nPassage {id}:\n\"\"\"\n{marked_text}\n\"\"\"\n\
             Output your translation for Passage {id} as:\n\
             <<<TRANSLATION_START_{id}>>>\n\
             [translation with all RUN markers preserved]\n\
             <<<TRANSLATION_END_{id}>>>\n"
        ));
    }

    format!(
        "You are a professional translator with expertise in preserving complex document\n\
         formatting. Translate the following {count} passage(s) into {language} with absolute\n\
         format preservation.\n\
         \n\
         RUN MARKERS ARE SACRED:\n\
         - ««RUN0:B»»text««/RUN0»» means run 0 is bold.\n\
         - ««RUN1:I,U»»text««/RUN1»» means run 1 is italic and underlined.\n\
         - ««RUN2:F:Arial_Black,SZ:14,C:FF0000»»text««/RUN2»» carries font, size and color.\n\
         - Never modify, remove, reorder, merge or split these markers.\n\
         \n\
         FORMATTING CODES:\n\
         B=Bold, I=Italic, U=Underline, S=Strike, SUB=Subscript, SUP=Superscript,\n\
         AC=AllCaps, SC=SmallCaps, F:Name=Font (spaces as _), SZ:points=Size,\n\
         C:RRGGBB=Color, H:name=Highlight, PLAIN=no formatting.\n\
         \n\
         TRANSLATION RULES:\n\
         - Translate ONLY the text between markers; keep every marker verbatim.\n\
         - Keep the exact number and order of runs: RUN0, RUN1, RUN2...\n\
         - Preserve spacing and line breaks inside each run.\n\
         - Preserve all punctuation exactly; translate every source-language word.\n\
         \n\
         Example:\n\
         Input:   ««RUN0:B»»Welcome!««/RUN0»»««RUN1:PLAIN»» Here we have ««/RUN1»»««RUN2:I»»italic text««/RUN2»»\n\
         Spanish: ««RUN0:B»»¡Bienvenido!««/RUN0»»««RUN1:PLAIN»» Aquí tenemos ««/RUN1»»««RUN2:I»»texto en cursiva««/RUN2»»\n\
         \n\
         OUTPUT FORMAT:\n\
         Wrap each passage's translation in its own delimiters, exactly once, and never put\n\
         delimiter markers inside the translation text. Never include tags like\n\
         <untranslated> in your output.\n\
         {passages}",
        count = marked.len(),
        language = language,
        passages = passages,
    )
}
