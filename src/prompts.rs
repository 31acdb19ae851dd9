//! Fixed prompt text for the generation, repair and description calls.

pub const GENERATION_INSTRUCTION: &str = "\
You are an expert frontend engineer. Build a single React component in one \
file that reproduces the attached image (a screenshot, wireframe or sketch) \
as closely as possible, both visually and functionally. Use Tailwind CSS \
utility classes for styling and plain React with hooks for behavior. \
Export the component as the default export. Return ONLY the complete source \
of the file: no commentary, no markdown fencing.";

pub const COMPONENT_LIBRARY_ADDENDUM: &str = "\
Prefer shadcn/ui primitives (Button, Card, Input, Dialog and friends, \
imported from '@/components/ui') over hand-rolled equivalents where they \
fit the design.";

pub const REPAIR_INSTRUCTION: &str = "\
The following generated file appears to be syntactically broken (unbalanced \
brackets, an unterminated string or template literal, or a stray quote). \
Return the corrected, complete file and nothing else: no commentary, no \
markdown fencing, no explanation of the fix.";

pub const DESCRIBE_IMAGE_PROMPT: &str = "\
Describe this UI image in two or three sentences: the kind of interface it \
shows, its main regions and any notable visual style. The description will \
be used to steer code generation, so favor layout facts over prose.";
