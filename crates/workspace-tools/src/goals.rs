//! Goal presets for the built-in agent roles.

use agent_core::Goal;

/// Goals of the file exploration agent
pub fn file_management_goals() -> Vec<Goal> {
    vec![
        Goal::new(
            1,
            "file_management",
            "Manage files in the current directory by:\n\
             1. Listing files when needed\n\
             2. Reading file contents when needed\n\
             3. Searching within listed files for information\n\
             4. Providing helpful explanations about file contents",
        ),
        Goal::new(
            2,
            "Terminate",
            "Terminate the session when tasks are complete with a helpful summary",
        ),
    ]
}

/// Goals of the README generation agent
pub fn readme_goals() -> Vec<Goal> {
    vec![
        Goal::new(
            1,
            "readme_generation",
            "Generate a high-quality README.md for the current project.\n\n\
             The README MUST:\n\
             - Follow a professional open-source README structure\n\
             - Be clear, concise, and well-organized\n\
             - Use Markdown headings, lists, and code blocks where appropriate\n\
             - Be suitable for GitHub presentation",
        ),
        Goal::new(
            2,
            "structure_and_sections",
            "The README should include (when applicable):\n\n\
             1. Project title and short description\n\
             2. Overview / Purpose\n\
             3. Core architecture or design (high-level)\n\
             4. Key components and their responsibilities\n\
             5. Project structure (directory layout)\n\
             6. How to run / use the project\n\
             7. How to extend or customize it\n\
             8. Roadmap or future improvements\n\
             9. License or usage notes (if inferable)\n\n\
             Do NOT invent features or files that do not exist.",
        ),
        Goal::new(
            3,
            "file_analysis_strategy",
            "To generate the README:\n\n\
             - First, discover available files using list_project_files\n\
             - Read only the most relevant source files\n\
             - Infer architecture and behavior from actual code\n\
             - Do NOT attempt to read every file blindly",
        ),
        Goal::new(
            4,
            "output_handling",
            "After generating the README content:\n\n\
             - Write the generated README to the output directory using write_output_file\n\
             - Ensure the output is valid Markdown",
        ),
        Goal::new(
            5,
            "termination_policy",
            "Terminate ONLY when:\n\n\
             - The README has been fully generated and written to disk\n\
             - Or no meaningful progress can be made after reasonable attempts\n\n\
             When terminating:\n\
             - Use the terminate tool\n\
             - Provide a short reason (NOT the README content)",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priorities_are_sequential() {
        for goals in [file_management_goals(), readme_goals()] {
            let priorities: Vec<i32> = goals.iter().map(|g| g.priority).collect();
            let expected: Vec<i32> = (1..=i32::try_from(goals.len()).unwrap()).collect();
            assert_eq!(priorities, expected);
        }
    }

    #[test]
    fn test_multiline_descriptions_keep_line_breaks() {
        let goals = file_management_goals();
        assert!(goals[0].description.contains("\n2. Reading file contents"));
    }
}
