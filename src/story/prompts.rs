//! Prompt templates for the story game.

/// Opening scene from the player's premise.
pub fn start_story(premise: &str) -> String {
    format!(
        "Write a short story, at least 300 and at most 500 characters. The story is: {premise}. \
         I will continue the story myself. My app is a storyteller game where the player \
         continues the story and the next part is generated from the choice they make. \
         Do not finish the story, leave it open for me to continue. \
         Reply with the story text only, it goes straight into the game."
    )
}

/// Next part of the story after the player acts.
pub fn continue_story(story: &str, action: &str) -> String {
    format!(
        "{story}I want to do this in the story - {action}; reply with only the text of the \
         story's continuation, right away, without any remarks of your own."
    )
}

/// Four candidate actions for the current story state.
pub fn list_actions(story: &str) -> String {
    format!(
        "{story}Give me 4 possible actions in the format [Action1!Action2!Action3!Action4]. \
         Send the actions inside square brackets separated by exclamation marks, do not repeat \
         the story text, send only the options."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_embed_caller_text() {
        assert!(start_story("a lighthouse keeper").contains("The story is: a lighthouse keeper."));

        let p = continue_story("The door creaks. ", "open it");
        assert!(p.starts_with("The door creaks. I want to do this in the story - open it;"));

        let p = list_actions("The door creaks. ");
        assert!(p.starts_with("The door creaks. Give me 4 possible actions"));
        assert!(p.contains("[Action1!Action2!Action3!Action4]"));
    }
}
